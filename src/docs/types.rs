use serde::{Deserialize, Serialize};

/// Backend-assigned document identifier. Opaque to the client; numeric ids
/// are carried in their decimal string form.
pub type DocId = String;

/// A document known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub filename: String,
}

impl Document {
    pub fn new(id: impl Into<DocId>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
        }
    }
}

/// What the backend acknowledged for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAck {
    /// `None` when the backend omitted the identifier entirely.
    pub id: Option<DocId>,
    pub filename: Option<String>,
    pub path: Option<String>,
    pub extracted_chars: Option<usize>,
}
