//! Request handlers for the directory API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use groupmirror_directory::Status;
use groupmirror_sync_engine::{DirectoryView, PublishedDirectory};
use serde_json::json;
use std::sync::Arc;

/// Link index served at `/` and `/api`.
pub const INDEX_HTML: &str = r#"<a href="/">/</a></br>
<a href="/api">/api</a></br>
<a href="/api/status">/api/status</a></br>
<a href="/api/directory">/api/directory</a></br>
<a href="/api/groups">/api/groups</a></br>
<a href="/api/members">/api/members</a></br>
<a href="/health">/health</a></br>
"#;

/// Context shared by all handlers.
#[derive(Clone)]
pub struct HandlerContext {
    /// The directory being served.
    pub view: Arc<dyn DirectoryView>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(view: Arc<dyn DirectoryView>) -> Self {
        Self { view }
    }

    /// Serializes part of the published directory, or `{}` before the
    /// first publish.
    fn published<T, F>(&self, select: F) -> Response
    where
        T: serde::Serialize,
        F: FnOnce(&PublishedDirectory) -> &T,
    {
        match self.view.snapshot() {
            Some(published) => Json(select(&published)).into_response(),
            None => Json(json!({})).into_response(),
        }
    }
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn health() -> StatusCode {
    StatusCode::OK
}

pub(crate) async fn status(State(context): State<HandlerContext>) -> Json<Status> {
    Json(context.view.status())
}

pub(crate) async fn directory(State(context): State<HandlerContext>) -> Response {
    context.published(|p| &p.directory)
}

pub(crate) async fn groups(State(context): State<HandlerContext>) -> Response {
    context.published(|p| &p.addresses)
}

pub(crate) async fn members(State(context): State<HandlerContext>) -> Response {
    context.published(|p| &p.closure)
}
