//! Atomically published directory snapshots.

use arc_swap::ArcSwapOption;
use groupmirror_directory::{
    build_indices, AddressIndex, DirectorySnapshot, Indices, MembershipClosure,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// A snapshot together with the indices derived from it.
///
/// Never mutated once built. A new refresh builds a new value and swaps it
/// in whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDirectory {
    /// The raw group mapping.
    pub directory: DirectorySnapshot,
    /// Address → identity.
    pub addresses: AddressIndex,
    /// Member → enclosing groups.
    pub closure: MembershipClosure,
}

impl PublishedDirectory {
    /// Builds both indices for a snapshot.
    ///
    /// Nesting cycles are skipped by the index builder and logged here.
    pub fn build(directory: DirectorySnapshot) -> Self {
        let Indices {
            addresses,
            closure,
            cycles,
        } = build_indices(&directory);

        for cycle in &cycles {
            warn!(
                outer = %cycle.outer,
                via = %cycle.via,
                target = %cycle.target,
                "Skipping nested group cycle while resolving memberships"
            );
        }

        Self {
            directory,
            addresses,
            closure,
        }
    }
}

/// Holder of the currently published directory.
///
/// Readers get an `Arc` to one complete [`PublishedDirectory`]; a publish
/// swaps the pointer and never touches a value a reader may hold.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: ArcSwapOption<PublishedDirectory>,
    generation: AtomicU64,
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the published directory and returns it.
    pub fn publish(&self, published: PublishedDirectory) -> Arc<PublishedDirectory> {
        let published = Arc::new(published);
        self.current.store(Some(Arc::clone(&published)));
        self.generation.fetch_add(1, Ordering::SeqCst);
        published
    }

    /// Returns the published directory, if any.
    pub fn load(&self) -> Option<Arc<PublishedDirectory>> {
        self.current.load_full()
    }

    /// Returns true if nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.current.load().is_none()
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
