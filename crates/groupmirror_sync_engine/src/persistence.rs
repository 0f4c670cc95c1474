//! On-disk directory snapshots.
//!
//! Layout of a storage location:
//!
//! ```text
//! <location>/
//! ├─ directory.json       # Last published snapshot
//! └─ directory.json.tmp   # Write in progress (renamed over directory.json)
//! ```
//!
//! Only the raw group mapping is stored. Indices are rebuilt on restore.

use crate::error::SyncResult;
use groupmirror_directory::{snapshot_from_json, snapshot_to_json, DirectorySnapshot};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the persisted snapshot.
pub const DIRECTORY_FILE: &str = "directory.json";

/// Temporary file for atomic snapshot writes.
const DIRECTORY_TEMP: &str = "directory.json.tmp";

/// Writes a snapshot to `<location>/directory.json`.
///
/// Does nothing when no location is configured. The directory is created
/// if missing.
pub fn save(snapshot: &DirectorySnapshot, location: Option<&Path>) -> SyncResult<()> {
    let Some(location) = location else {
        return Ok(());
    };

    fs::create_dir_all(location)?;
    let data = snapshot_to_json(snapshot)?;

    let temp_path = location.join(DIRECTORY_TEMP);
    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, location.join(DIRECTORY_FILE))?;
    Ok(())
}

/// Reads a persisted snapshot.
///
/// A directory location has [`DIRECTORY_FILE`] appended; any other path is
/// read as the snapshot file itself. Returns `Ok(None)` when no location is
/// configured or nothing has been saved there yet.
pub fn restore(location: Option<&Path>) -> SyncResult<Option<DirectorySnapshot>> {
    let Some(location) = location else {
        return Ok(None);
    };

    let path = snapshot_path(location);
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read(&path)?;
    Ok(Some(snapshot_from_json(&data)?))
}

/// Resolves the snapshot file for a storage location.
pub fn snapshot_path(location: &Path) -> PathBuf {
    if location.is_dir() {
        location.join(DIRECTORY_FILE)
    } else {
        location.to_path_buf()
    }
}
