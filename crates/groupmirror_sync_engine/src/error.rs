//! Error types for the sync engine.

use groupmirror_directory::DirectoryError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while configuring, syncing or persisting.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Service account credentials could not be read or parsed.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// Token exchange with the upstream authority failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// Network or transport error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream response could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Persisted directory could not be decoded or encoded.
    #[error("directory format error: {0}")]
    Directory(#[from] DirectoryError),

    /// Filesystem error while persisting or restoring.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No persisted directory exists at the given location.
    #[error("no directory snapshot found at {0}")]
    SnapshotNotFound(PathBuf),
}

impl SyncError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true if this error is a construction-time misconfiguration.
    pub fn is_config(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }

    /// Returns true if this error came from talking to the upstream
    /// directory. These only cost one sync interval.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SyncError::Credentials(_)
                | SyncError::Authentication(_)
                | SyncError::Upstream { .. }
                | SyncError::Transport(_)
                | SyncError::Protocol(_)
        )
    }

    /// Returns true if this error came from reading or writing the
    /// persisted snapshot.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            SyncError::Directory(_) | SyncError::Io(_) | SyncError::SnapshotNotFound(_)
        )
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Protocol(err.to_string())
        } else {
            SyncError::Transport(err.to_string())
        }
    }
}
