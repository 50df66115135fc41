use std::path::PathBuf;

use thiserror::Error;

/// Rejected locally before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("no document selected")]
    NoDocumentSelected,
    #[error("question is empty")]
    EmptyQuestion,
}

impl ValidationError {
    /// Prompt shown to the user instead of performing the action.
    pub fn prompt(&self) -> &'static str {
        match self {
            ValidationError::NoFileSelected => "Please select a file first.",
            ValidationError::NoDocumentSelected => "Please select a document first.",
            ValidationError::EmptyQuestion => "Please enter a question.",
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Network {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// A response body matched none of the shapes the adapter knows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("expected a string or an object with one of {expected:?}, got {found}")]
    Unrecognized {
        expected: &'static [&'static str],
        found: &'static str,
    },
    #[error("expected {expected}, got {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("document entry is missing `{0}`")]
    MissingField(&'static str),
}

/// Failure of a read path. Always absorbed by the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload failed: {0}")]
    Transport(#[from] TransportError),
    #[error("upload response not understood: {0}")]
    Shape(#[from] ShapeError),
}
