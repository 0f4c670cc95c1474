//! CLI command implementations.

pub mod mock;
pub mod server;
