//! HTTP basic authentication.
//!
//! Every API route checks the `Authorization` header against one configured
//! login. The comparison runs in constant time over the decoded
//! `username:password` bytes.

use crate::error::{ServerError, ServerResult};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Username used for generated logins.
pub const GENERATED_USERNAME: &str = "admin";

/// Length of generated passwords.
pub const GENERATED_PASSWORD_LEN: usize = 25;

/// A single accepted basic auth login.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// Creates a login from its parts.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parses a login in `username:password` form.
    ///
    /// The password may itself contain colons; the split is at the first.
    pub fn parse(login: &str) -> ServerResult<Self> {
        let (username, password) = login.split_once(':').ok_or_else(|| {
            ServerError::InvalidLogin(
                "missing colon in basic auth argument, format is <username>:<password>".into(),
            )
        })?;
        Ok(Self::new(username, password))
    }

    /// Generates a login with a random alphanumeric password.
    pub fn generate() -> Self {
        let password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_PASSWORD_LEN)
            .map(char::from)
            .collect();
        Self::new(GENERATED_USERNAME, password)
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the login in `username:password` form.
    pub fn login(&self) -> String {
        format!("{}:{}", self.username, self.password)
    }

    /// Returns true if the decoded credentials match this login.
    pub fn matches(&self, credentials: &[u8]) -> bool {
        self.login().as_bytes().ct_eq(credentials).into()
    }

    /// Checks an `Authorization` header value.
    pub fn validate_header(&self, header: Option<&str>) -> ServerResult<()> {
        let header =
            header.ok_or_else(|| ServerError::AuthenticationFailed("missing credentials".into()))?;

        let encoded = match header.split_once(' ') {
            Some((scheme, encoded)) if scheme.eq_ignore_ascii_case("basic") => encoded.trim(),
            _ => {
                return Err(ServerError::AuthenticationFailed(
                    "unsupported authorization scheme".into(),
                ))
            }
        };

        let credentials = STANDARD
            .decode(encoded)
            .map_err(|_| ServerError::AuthenticationFailed("malformed credentials".into()))?;

        if self.matches(&credentials) {
            Ok(())
        } else {
            Err(ServerError::AuthenticationFailed("invalid credentials".into()))
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Middleware that rejects requests without a valid login.
pub async fn require_basic_auth(
    State(auth): State<Arc<BasicAuth>>,
    request: Request,
    next: Next,
) -> Response {
    let result = auth.validate_header(
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    );

    match result {
        Ok(()) => next.run(request).await,
        Err(e) => {
            debug!(path = %request.uri().path(), error = %e, "Rejected request");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(credentials: &str) -> String {
        format!("Basic {}", STANDARD.encode(credentials))
    }

    #[test]
    fn parse_login() {
        let auth = BasicAuth::parse("ops:s3cr:et").unwrap();
        assert_eq!(auth.username(), "ops");
        assert_eq!(auth.login(), "ops:s3cr:et");

        let auth = BasicAuth::parse("ops:").unwrap();
        assert_eq!(auth.login(), "ops:");
    }

    #[test]
    fn parse_rejects_missing_colon() {
        let err = BasicAuth::parse("opssecret").unwrap_err();
        assert!(matches!(err, ServerError::InvalidLogin(_)));
    }

    #[test]
    fn generated_login() {
        let auth = BasicAuth::generate();
        assert_eq!(auth.username(), GENERATED_USERNAME);

        let login = auth.login();
        let password = login.strip_prefix("admin:").unwrap();
        assert_eq!(password.len(), GENERATED_PASSWORD_LEN);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(BasicAuth::generate(), auth);
    }

    #[test]
    fn validate_header() {
        let auth = BasicAuth::new("ops", "secret");

        assert!(auth.validate_header(Some(&header("ops:secret"))).is_ok());
        assert!(auth
            .validate_header(Some(&format!("basic {}", STANDARD.encode("ops:secret"))))
            .is_ok());

        assert!(auth.validate_header(None).is_err());
        assert!(auth.validate_header(Some(&header("ops:wrong"))).is_err());
        assert!(auth.validate_header(Some(&header("ops"))).is_err());
        assert!(auth.validate_header(Some(&header("ops:secret2"))).is_err());
        assert!(auth.validate_header(Some("Bearer abc")).is_err());
        assert!(auth.validate_header(Some("Basic !!!")).is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let auth = BasicAuth::new("ops", "secret");
        let debug = format!("{auth:?}");
        assert!(debug.contains("ops"));
        assert!(!debug.contains("secret"));
    }
}
