//! Static directory served from a persisted snapshot.

use crate::error::{SyncError, SyncResult};
use crate::persistence;
use crate::store::{PublishedDirectory, SnapshotStore};
use crate::view::DirectoryView;
use groupmirror_directory::Status;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A directory loaded once from disk and never refreshed.
///
/// Used for mock mode. The status reports the loaded counts and no sync
/// times.
#[derive(Debug)]
pub struct StaticDirectory {
    store: SnapshotStore,
    status: Status,
}

impl StaticDirectory {
    /// Loads the snapshot at `location`.
    ///
    /// `location` may be a storage directory or the snapshot file itself.
    pub fn load(location: impl AsRef<Path>) -> SyncResult<Self> {
        let location = location.as_ref();
        let directory = persistence::restore(Some(location))?
            .ok_or_else(|| SyncError::SnapshotNotFound(persistence::snapshot_path(location)))?;

        let store = SnapshotStore::new();
        let published = store.publish(PublishedDirectory::build(directory));

        let mut status = Status::default();
        status.update_counts(Some(&published.directory));
        info!(
            groups = status.known_groups,
            users = status.known_users,
            path = %location.display(),
            "Loaded static directory"
        );

        Ok(Self { store, status })
    }
}

impl DirectoryView for StaticDirectory {
    fn status(&self) -> Status {
        self.status.clone()
    }

    fn snapshot(&self) -> Option<Arc<PublishedDirectory>> {
        self.store.load()
    }
}
