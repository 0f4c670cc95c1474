//! Error types for the directory model.

use thiserror::Error;

/// Result type for directory model operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur while decoding or encoding directory data.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The document is not valid directory JSON.
    #[error("invalid directory json: {0}")]
    Json(#[from] serde_json::Error),
}
