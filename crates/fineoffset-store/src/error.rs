//! Error types for fineoffset-store.

use std::path::PathBuf;

/// Result type for fineoffset-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fineoffset-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to create the directory holding the store file.
    #[error("Failed to create store directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The temporary file could not be moved over the store file.
    #[error("Failed to replace store file {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Write refused by the store (in-memory stores only).
    #[error("Write rejected: {0}")]
    WriteRejected(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
