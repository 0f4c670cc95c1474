//! # groupmirror server
//!
//! Read-only HTTP API over a mirrored directory.
//!
//! This crate provides:
//! - The axum router for the status, directory, address and membership
//!   endpoints
//! - Basic auth middleware
//! - `serve`, which binds the API and runs until ctrl-c
//!
//! # Routes
//!
//! | Route            | Body                                    |
//! |------------------|-----------------------------------------|
//! | `/`, `/api`      | HTML link index                         |
//! | `/api/status`    | Sync status                             |
//! | `/api/directory` | Raw group mapping, or `{}`              |
//! | `/api/groups`    | Address → identity index, or `{}`       |
//! | `/api/members`   | Member → enclosing groups, or `{}`      |
//! | `/health`        | Empty 200, no authentication            |
//!
//! ```rust,ignore
//! use groupmirror_server::{serve, BasicAuth, ServerConfig};
//! use groupmirror_sync_engine::StaticDirectory;
//! use std::sync::Arc;
//!
//! let view = Arc::new(StaticDirectory::load("/var/lib/groupmirror")?);
//! serve(ServerConfig::new(BasicAuth::parse("ops:secret")?), view).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
mod server;

pub use auth::{require_basic_auth, BasicAuth, GENERATED_PASSWORD_LEN, GENERATED_USERNAME};
pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult, BASIC_AUTH_CHALLENGE};
pub use handler::{HandlerContext, INDEX_HTML};
pub use server::{build_router, serve, serve_listener};
