//! Client for the HTTP API of a running mirror.
//!
//! Downstream services use it to pull the raw directory from a mirror and
//! build the indices locally. It is also a [`DirectorySource`], so one
//! mirror can be chained behind another.

use crate::error::{SyncError, SyncResult};
use crate::source::DirectorySource;
use crate::store::PublishedDirectory;
use async_trait::async_trait;
use groupmirror_directory::DirectorySnapshot;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Request timeout used by [`MirrorClient::new`].
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Reads the directory from a mirror's `/api/directory` endpoint.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    http: Client,
    directory_url: Url,
    username: String,
    password: String,
}

impl MirrorClient {
    /// Creates a client for the mirror at `base_url`.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SyncResult<Self> {
        let http = Client::builder().timeout(DEFAULT_CLIENT_TIMEOUT).build()?;
        Self::with_client(http, base_url, username, password)
    }

    /// Creates a client that sends requests through `http`.
    pub fn with_client(
        http: Client,
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SyncResult<Self> {
        let mut directory_url = Url::parse(base_url)
            .map_err(|e| SyncError::config(format!("invalid mirror url {base_url}: {e}")))?;
        directory_url
            .path_segments_mut()
            .map_err(|_| SyncError::config(format!("invalid mirror url {base_url}")))?
            .pop_if_empty()
            .extend(["api", "directory"]);

        Ok(Self {
            http,
            directory_url,
            username: username.into(),
            password: password.into(),
        })
    }

    /// Fetches the directory and builds both indices from it.
    pub async fn sync_directory(&self) -> SyncResult<PublishedDirectory> {
        let directory = self.fetch().await?;
        Ok(PublishedDirectory::build(directory))
    }
}

#[async_trait]
impl DirectorySource for MirrorClient {
    async fn fetch(&self) -> SyncResult<DirectorySnapshot> {
        debug!(url = %self.directory_url, "Fetching directory from mirror");
        let response = self
            .http
            .get(self.directory_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_url() {
        let client = MirrorClient::new("http://mirror.internal:8080/", "admin", "secret").unwrap();
        assert_eq!(
            client.directory_url.as_str(),
            "http://mirror.internal:8080/api/directory"
        );

        let client = MirrorClient::new("http://proxy/groups", "admin", "secret").unwrap();
        assert_eq!(client.directory_url.as_str(), "http://proxy/groups/api/directory");
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(MirrorClient::new("mirror:8080", "a", "b").is_err());
        assert!(MirrorClient::new("::", "a", "b").unwrap_err().is_config());
    }
}
