use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{shapes, ApiClient};
use crate::config::UploadFlags;
use crate::error::{UploadError, ValidationError};

use super::types::{DocId, Document};

// Trailing empty segment: the backend route ends in a slash.
const UPLOAD_PATH: [&str; 2] = ["upload", ""];
const CHUNK_SIZE: usize = 64 * 1024;

/// A file read from disk and ready to send.
pub struct PendingUpload {
    path: PathBuf,
    filename: String,
    bytes: Bytes,
}

impl PendingUpload {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Client-side id used only when the backend acknowledges an upload without
/// naming the document. Content-addressed so repeated uploads agree.
fn placeholder_id(content: &[u8]) -> DocId {
    let hex = blake3::hash(content).to_hex();
    format!("local-{}", &hex[..16])
}

fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) as u64 * 100) / total as u64) as u8
}

/// Chunks of `bytes` that bump `progress` as the transport pulls them.
/// Chunks are slices of the same buffer, not copies.
fn progress_stream(
    bytes: Bytes,
    progress: Arc<watch::Sender<u8>>,
) -> impl futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = bytes.len();
    futures::stream::iter((0..total).step_by(CHUNK_SIZE)).map(move |start| {
        let sent = (start + CHUNK_SIZE).min(total);
        let chunk = bytes.slice(start..sent);
        let pct = percent(sent, total);
        progress.send_if_modified(|current| {
            if pct > *current {
                *current = pct;
                true
            } else {
                false
            }
        });
        Ok::<_, std::io::Error>(chunk)
    })
}

/// Streams files to the backend as a single multipart request and publishes
/// progress (0..=100) on a watch channel.
pub struct UploadCoordinator {
    api: Arc<ApiClient>,
    flags: UploadFlags,
    progress: Arc<watch::Sender<u8>>,
}

impl UploadCoordinator {
    pub fn new(api: Arc<ApiClient>, flags: UploadFlags) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            api,
            flags,
            progress: Arc::new(progress),
        }
    }

    /// Progress of the current upload. Non-decreasing while bytes go out,
    /// back to 0 once the request finishes either way.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Validate the selection and read the file. No request is made.
    pub async fn prepare(&self, file: Option<&Path>) -> Result<PendingUpload, UploadError> {
        let path = file.ok_or(ValidationError::NoFileSelected)?;
        let bytes = tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|source| UploadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(PendingUpload {
            path: path.to_path_buf(),
            filename,
            bytes,
        })
    }

    pub async fn send(&self, pending: PendingUpload) -> Result<Document, UploadError> {
        let PendingUpload {
            path,
            filename,
            bytes,
        } = pending;
        let total = bytes.len();
        let placeholder = placeholder_id(&bytes);

        info!(path = ?path, size = total, "upload started");
        self.progress.send_replace(0);

        let stream = progress_stream(bytes, self.progress.clone());
        let part = Part::stream_with_length(Body::wrap_stream(stream), total as u64)
            .file_name(filename.clone());
        let form = Form::new().part("file", part);

        let result = self
            .api
            .post_multipart(&UPLOAD_PATH, &self.flags.as_query(), form)
            .await;
        self.progress.send_replace(0);

        let ack = shapes::upload_ack(&result?)?;
        let id = match ack.id {
            Some(id) => id,
            None => {
                warn!(placeholder = %placeholder, "backend omitted the document id, using a local placeholder");
                placeholder
            }
        };
        let document = Document::new(id, ack.filename.unwrap_or(filename));
        info!(
            doc_id = %document.id,
            filename = %document.filename,
            stored_at = ?ack.path,
            extracted_chars = ?ack.extracted_chars,
            "upload acknowledged"
        );
        Ok(document)
    }
}
