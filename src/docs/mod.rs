pub mod types;
pub mod upload;

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{shapes, ApiClient};
use crate::error::{FetchError, TransportError};

use types::{DocId, Document};

const DOCUMENTS: &str = "documents";

/// Listing and deletion of the backend's documents.
pub struct DocumentRegistry {
    api: Arc<ApiClient>,
}

impl DocumentRegistry {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// List documents in the order the backend returns them.
    pub async fn list(&self) -> Result<Vec<Document>, FetchError> {
        let value = self.api.get_json(&[DOCUMENTS]).await?;
        let docs = shapes::document_list(&value)?;
        debug!(count = docs.len(), "documents listed");
        Ok(docs)
    }

    /// Delete a document. Callers must have obtained confirmation first.
    pub async fn delete(&self, id: &DocId) -> Result<(), TransportError> {
        self.api.delete(&[DOCUMENTS, id.as_str()]).await?;
        info!(doc_id = %id, "document deleted");
        Ok(())
    }
}
