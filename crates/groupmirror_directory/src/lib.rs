//! # groupmirror directory model
//!
//! Directory model types and index builders for groupmirror.
//!
//! This crate provides:
//! - `Group` and `Member` records as fetched from the upstream directory
//! - `DirectorySnapshot`, the raw group mapping that gets persisted
//! - Address and membership-closure index builders
//! - `Status` reported by sync engines
//!
//! This is a pure model crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod group;
mod index;
mod status;

pub use error::{DirectoryError, DirectoryResult};
pub use group::{
    count_members, snapshot_from_json, snapshot_to_json, DirectorySnapshot, Group, Member,
    GROUP_TYPE,
};
pub use index::{
    build_address_index, build_indices, build_membership_closure, AddressIndex, ClosureBuild,
    Identity, Indices, MembershipClosure, NestingCycle,
};
pub use status::{format_duration, Status};
