//! Upstream directory abstraction.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use groupmirror_directory::DirectorySnapshot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A source of complete directory snapshots.
///
/// Implementations paginate internally. A failure on any page fails the
/// whole fetch; there are no partial results and no retries within a call.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Fetches the full directory.
    async fn fetch(&self) -> SyncResult<DirectorySnapshot>;
}

/// Builds an authenticated [`DirectorySource`].
///
/// The engine calls this at the start of a cycle until it succeeds once,
/// then keeps the source for every later cycle. It runs on the refresh
/// loop's task, so file reads go through `tokio::fs`.
#[async_trait]
pub trait SourceConnector: Send + Sync + 'static {
    /// The source this connector builds.
    type Source: DirectorySource + 'static;

    /// Reads credentials and builds the source.
    async fn connect(&self) -> SyncResult<Self::Source>;
}

/// A scripted directory source for testing.
///
/// Clones share state, so a test can keep a handle while the engine owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    response: Arc<Mutex<Option<Result<DirectorySnapshot, String>>>>,
    fetches: Arc<AtomicUsize>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl MockSource {
    /// Creates a mock source with no response set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following fetch return this snapshot.
    pub fn set_snapshot(&self, snapshot: DirectorySnapshot) {
        *self.response.lock() = Some(Ok(snapshot));
    }

    /// Makes every following fetch fail with this message.
    pub fn set_failure(&self, message: impl Into<String>) {
        *self.response.lock() = Some(Err(message.into()));
    }

    /// Number of fetches so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Makes following fetches wait until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.lock().get_or_insert_with(|| Arc::new(Notify::new()));
    }

    /// Lets a held fetch return and stops holding later ones.
    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl DirectorySource for MockSource {
    async fn fetch(&self) -> SyncResult<DirectorySnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let response = self.response.lock().clone();
        match response {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(message)) => Err(SyncError::Transport(message)),
            None => Err(SyncError::Protocol("No mock directory response set".into())),
        }
    }
}

/// A connector that hands out a [`MockSource`], optionally failing first.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    source: MockSource,
    failures_left: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
}

impl MockConnector {
    /// Creates a connector for the given source.
    pub fn new(source: MockSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Makes the next `count` connect attempts fail.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Number of connect attempts so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceConnector for MockConnector {
    type Source = MockSource;

    async fn connect(&self) -> SyncResult<MockSource> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SyncError::Credentials("mock credentials unavailable".into()));
        }
        Ok(self.source.clone())
    }
}
