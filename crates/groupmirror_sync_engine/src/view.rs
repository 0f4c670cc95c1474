//! Read interface shared by the live engine and the static mirror.

use crate::store::PublishedDirectory;
use groupmirror_directory::Status;
use std::sync::Arc;

/// Read-only access to a mirrored directory.
pub trait DirectoryView: Send + Sync + 'static {
    /// Returns a copy of the current status.
    fn status(&self) -> Status;

    /// Returns the published directory, or `None` before the first publish.
    fn snapshot(&self) -> Option<Arc<PublishedDirectory>>;
}
