//! Sync engine lifecycle and refresh loop.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::persistence;
use crate::source::{DirectorySource, SourceConnector};
use crate::store::{PublishedDirectory, SnapshotStore};
use crate::view::DirectoryView;
use chrono::{DateTime, TimeDelta, Utc};
use groupmirror_directory::Status;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a [`SyncEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, refresh loop not spawned yet.
    NotStarted,
    /// Refresh loop is running.
    Running,
    /// Shut down. Cannot be started again.
    Stopped,
}

impl EngineState {
    /// Returns true if the refresh loop is running.
    pub fn is_running(&self) -> bool {
        matches!(self, EngineState::Running)
    }
}

/// What a single refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No upstream client could be built; nothing was fetched.
    Skipped,
    /// The fetch failed; the previous snapshot stays published.
    Failed,
    /// A new snapshot was published.
    Published {
        /// Number of groups in the new snapshot.
        groups: usize,
    },
}

enum Lifecycle<C> {
    NotStarted(C),
    Running {
        task: JoinHandle<()>,
        shutdown: watch::Sender<bool>,
    },
    Stopped,
}

impl<C> Lifecycle<C> {
    fn state(&self) -> EngineState {
        match self {
            Lifecycle::NotStarted(_) => EngineState::NotStarted,
            Lifecycle::Running { .. } => EngineState::Running,
            Lifecycle::Stopped => EngineState::Stopped,
        }
    }
}

/// State shared between the engine handle and its refresh loop.
struct Shared {
    config: SyncConfig,
    store: SnapshotStore,
    status: RwLock<Status>,
}

impl Shared {
    fn new(config: SyncConfig) -> Self {
        Self {
            config,
            store: SnapshotStore::new(),
            status: RwLock::new(Status::default()),
        }
    }

    /// Seeds the store from the persisted snapshot, if there is one.
    fn restore(&self) {
        let location = self.config.storage_location.as_deref();
        match persistence::restore(location) {
            Ok(Some(directory)) => {
                let published = self.store.publish(PublishedDirectory::build(directory));
                self.status
                    .write()
                    .update_counts(Some(&published.directory));
                info!(
                    groups = published.directory.len(),
                    addresses = published.addresses.len(),
                    "Restored directory snapshot from storage"
                );
            }
            Ok(None) => debug!("No persisted directory snapshot to restore"),
            Err(e) => warn!(error = %e, "Unable to restore directory snapshot"),
        }
    }

    fn begin_sync(&self, started_at: DateTime<Utc>) {
        let mut status = self.status.write();
        status.last_sync = Some(started_at);
        status.sync_in_progress = true;
    }

    fn finish_sync(&self, started_at: DateTime<Utc>, elapsed: Duration, outcome: CycleOutcome) {
        let published = self.store.load();
        let mut status = self.status.write();
        status.last_sync_duration = elapsed;
        status.next_sync = self.next_sync();
        if matches!(outcome, CycleOutcome::Published { .. }) {
            status.last_success = Some(started_at);
        }
        status.update_counts(published.as_deref().map(|p| &p.directory));
        status.sync_in_progress = false;
    }

    fn schedule_next(&self) {
        self.status.write().next_sync = self.next_sync();
    }

    fn next_sync(&self) -> Option<DateTime<Utc>> {
        let interval = TimeDelta::from_std(self.config.sync_interval).ok()?;
        Utc::now().checked_add_signed(interval)
    }
}

/// Keeps a [`SnapshotStore`] in sync with an upstream directory.
///
/// The engine restores the persisted snapshot on construction, then
/// refreshes from upstream on a fixed interval once [`start`](Self::start)
/// is called. Readers go through [`DirectoryView`] and never wait on a
/// refresh.
pub struct SyncEngine<C: SourceConnector> {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle<C>>,
}

impl<C: SourceConnector> SyncEngine<C> {
    /// Creates a new engine and restores any persisted snapshot.
    ///
    /// Fails only on invalid configuration. A missing or unreadable
    /// snapshot is logged and the engine starts empty.
    pub fn new(config: SyncConfig, connector: C) -> SyncResult<Self> {
        config.validate()?;

        let shared = Arc::new(Shared::new(config));
        shared.restore();

        Ok(Self {
            shared,
            lifecycle: Mutex::new(Lifecycle::NotStarted(connector)),
        })
    }

    /// Spawns the refresh loop.
    ///
    /// Returns true if this call started the loop. Calling it again while
    /// running, or after shutdown, does nothing and returns false.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        let connector = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::NotStarted(connector) => connector,
            other => {
                *lifecycle = other;
                return false;
            }
        };

        let (shutdown, signal) = watch::channel(false);
        let worker = SyncWorker::new(Arc::clone(&self.shared), connector);
        let task = tokio::spawn(worker.run(signal));
        *lifecycle = Lifecycle::Running { task, shutdown };
        true
    }

    /// Stops the refresh loop and waits for it to exit.
    ///
    /// A cycle in progress runs to completion first. The published
    /// snapshot stays readable afterwards.
    pub async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Stopped);
        if let Lifecycle::Running { task, shutdown } = previous {
            let _ = shutdown.send(true);
            if let Err(e) = task.await {
                warn!(error = %e, "Sync loop ended abnormally");
            }
            info!("Sync engine stopped");
        }
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> EngineState {
        self.lifecycle.lock().state()
    }
}

impl<C: SourceConnector> DirectoryView for SyncEngine<C> {
    fn status(&self) -> Status {
        self.shared.status.read().clone()
    }

    fn snapshot(&self) -> Option<Arc<PublishedDirectory>> {
        self.shared.store.load()
    }
}

/// The refresh loop. Owns the connector and the upstream client.
struct SyncWorker<C: SourceConnector> {
    shared: Arc<Shared>,
    connector: C,
    source: Option<C::Source>,
}

impl<C: SourceConnector> SyncWorker<C> {
    fn new(shared: Arc<Shared>, connector: C) -> Self {
        Self {
            shared,
            connector,
            source: None,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.shared.config.sync_interval;
        info!(interval_secs = interval.as_secs(), "Sync loop started");

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        debug!("Sync loop exiting");
    }

    async fn run_cycle(&mut self) -> CycleOutcome {
        if self.source.is_none() {
            match self.connector.connect().await {
                Ok(source) => {
                    debug!("Built upstream directory client");
                    self.source = Some(source);
                }
                Err(e) => {
                    error!(error = %e, "Unable to build upstream directory client, skipping sync");
                    self.shared.schedule_next();
                    return CycleOutcome::Skipped;
                }
            }
        }
        let Some(source) = self.source.as_ref() else {
            return CycleOutcome::Skipped;
        };

        let started_at = Utc::now();
        let clock = Instant::now();
        self.shared.begin_sync(started_at);
        info!("Starting directory sync");

        let outcome = match source.fetch().await {
            Ok(directory) => {
                let published = self
                    .shared
                    .store
                    .publish(PublishedDirectory::build(directory));
                let location = self.shared.config.storage_location.as_deref();
                if let Err(e) = persistence::save(&published.directory, location) {
                    warn!(error = %e, "Unable to persist directory snapshot");
                }
                CycleOutcome::Published {
                    groups: published.directory.len(),
                }
            }
            Err(e) => {
                error!(error = %e, "Directory sync failed, keeping previous snapshot");
                CycleOutcome::Failed
            }
        };

        let elapsed = clock.elapsed();
        self.shared.finish_sync(started_at, elapsed, outcome);
        if let CycleOutcome::Published { groups } = outcome {
            info!(groups, elapsed_ms = elapsed.as_millis() as u64, "Directory sync finished");
        }
        outcome
    }
}
