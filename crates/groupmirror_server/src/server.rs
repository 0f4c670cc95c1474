//! Router assembly and the serve loop.

use crate::auth::{require_basic_auth, BasicAuth};
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{self, HandlerContext};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use groupmirror_sync_engine::DirectoryView;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Builds the API router.
///
/// Every route except `/health` requires `auth`.
pub fn build_router(auth: BasicAuth, view: Arc<dyn DirectoryView>) -> Router {
    let api = Router::new()
        .route("/", get(handler::index))
        .route("/api", get(handler::index))
        .route("/api/status", get(handler::status))
        .route("/api/directory", get(handler::directory))
        .route("/api/groups", get(handler::groups))
        .route("/api/members", get(handler::members))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(auth),
            require_basic_auth,
        ))
        .with_state(HandlerContext::new(view));

    Router::new()
        .route("/health", get(handler::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address and serves until ctrl-c.
pub async fn serve(config: ServerConfig, view: Arc<dyn DirectoryView>) -> ServerResult<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Directory API listening");
    serve_listener(listener, config.auth, view, shutdown_signal()).await
}

/// Serves on an already bound listener until `shutdown` completes.
pub async fn serve_listener<F>(
    listener: TcpListener,
    auth: BasicAuth,
    view: Arc<dyn DirectoryView>,
    shutdown: F,
) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(auth, view))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
