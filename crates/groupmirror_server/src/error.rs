//! Error types for the HTTP server.

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Challenge sent with every 401 response.
pub const BASIC_AUTH_CHALLENGE: &str = r#"Basic realm="Restricted""#;

/// Errors that can occur in the HTTP server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The configured login is not in `username:password` form.
    #[error("invalid login: {0}")]
    InvalidLogin(String),

    /// A request carried missing or wrong credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Binding or serving failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServerError::AuthenticationFailed(_))
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::AuthenticationFailed(_) => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, BASIC_AUTH_CHALLENGE)],
                "Unauthorized.\n",
            )
                .into_response(),
            other => (other.status_code(), format!("{other}\n")).into_response(),
        }
    }
}
