//! File delivery errors

use std::path::PathBuf;

/// Errors that can occur while handing an export file to its destination.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Writing the file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination refused the file.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

impl DeliveryError {
    /// Creates a new I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}
