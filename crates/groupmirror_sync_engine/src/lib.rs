//! # groupmirror sync engine
//!
//! Keeps a local mirror of an upstream group directory.
//!
//! This crate provides:
//! - `SyncEngine`, a background loop that refreshes the directory on a fixed
//!   interval
//! - `SnapshotStore`, which publishes each snapshot and its indices atomically
//! - JSON persistence of the raw snapshot, restored on startup
//! - `StaticDirectory`, a mirror served from a persisted file
//! - The Google Admin SDK directory source and service account tokens
//! - `MirrorClient`, which reads the directory back from a running mirror
//!
//! ## Refresh cycle
//!
//! 1. Build the upstream client if there is none yet
//! 2. Fetch every group and its members
//! 3. Build the address and membership closure indices
//! 4. Publish, then persist
//! 5. Update status and sleep for the interval
//!
//! ## Key Invariants
//!
//! - Readers see one complete snapshot, never a mix of two
//! - A failed refresh keeps the previous snapshot published
//! - Only invalid configuration is fatal; the loop never exits on error
//! - At most one refresh loop per engine

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod engine;
mod error;
mod google;
mod mock;
pub mod persistence;
mod source;
mod store;
mod view;

pub use client::{MirrorClient, DEFAULT_CLIENT_TIMEOUT};
pub use config::{
    SyncConfig, DEFAULT_API_BASE_URL, DEFAULT_CUSTOMER_ID, DEFAULT_SYNC_INTERVAL,
    MIN_SYNC_INTERVAL,
};
pub use engine::{CycleOutcome, EngineState, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use google::{
    GoogleConnector, GoogleDirectorySource, ServiceAccountKey, ServiceAccountTokenSource,
    StaticTokenSource, TokenSource, GROUP_READONLY_SCOPE, MEMBER_READONLY_SCOPE, PAGE_SIZE,
};
pub use mock::StaticDirectory;
pub use source::{DirectorySource, MockConnector, MockSource, SourceConnector};
pub use store::{PublishedDirectory, SnapshotStore};
pub use view::DirectoryView;
