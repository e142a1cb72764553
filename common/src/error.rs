//! Error types

use crate::record::ValidationReport;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationReport),

    #[error("Storage full: could not write {key}")]
    StorageFull { key: String },

    #[error("Storage write error: {0}")]
    StorageWrite(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error in {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("Bulk delete incomplete: removed {removed}, failed {}", failed.join(", "))]
    PartialDelete { removed: usize, failed: Vec<String> },

    #[error("Image error: {0}")]
    Image(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub fn decode(key: impl Into<String>, reason: impl ToString) -> Self {
        Error::Decode {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Persistence failures keep the in-memory form untouched.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::StorageFull { .. } | Error::StorageWrite(_))
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
