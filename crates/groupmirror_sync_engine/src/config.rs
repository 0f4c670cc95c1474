//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use std::path::PathBuf;
use std::time::Duration;

/// Shortest allowed interval between sync attempts.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Interval used when none is configured.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Customer id alias for the account the credentials belong to.
pub const DEFAULT_CUSTOMER_ID: &str = "my_customer";

/// Base URL of the upstream directory API.
pub const DEFAULT_API_BASE_URL: &str = "https://admin.googleapis.com";

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Path to the service account JSON file.
    pub credentials_path: PathBuf,
    /// Upstream customer id.
    pub customer_id: String,
    /// Only mirror groups of this domain.
    pub domain: Option<String>,
    /// User to impersonate when requesting tokens.
    pub subject: Option<String>,
    /// Time between the end of one attempt and the start of the next.
    pub sync_interval: Duration,
    /// Directory holding `directory.json`, if persistence is wanted.
    pub storage_location: Option<PathBuf>,
    /// Base URL of the upstream directory API.
    pub api_base_url: String,
    /// Timeout for each upstream request.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            customer_id: DEFAULT_CUSTOMER_ID.to_string(),
            domain: None,
            subject: None,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            storage_location: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the customer id.
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = customer_id.into();
        self
    }

    /// Sets the domain filter. An empty domain clears it.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = non_empty(domain.into());
        self
    }

    /// Sets the impersonation subject. An empty subject clears it.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = non_empty(subject.into());
        self
    }

    /// Sets the sync interval.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Sets the sync interval in whole minutes.
    pub fn with_sync_interval_minutes(self, minutes: u64) -> Self {
        self.with_sync_interval(Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// Sets the storage location.
    pub fn with_storage_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.storage_location = Some(location.into());
        self
    }

    /// Sets the upstream API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Checks the settings an engine cannot run without.
    pub fn validate(&self) -> SyncResult<()> {
        if self.credentials_path.as_os_str().is_empty() {
            return Err(SyncError::config("service account location cannot be empty"));
        }
        if self.customer_id.is_empty() {
            return Err(SyncError::config("customer id cannot be empty"));
        }
        if self.sync_interval < MIN_SYNC_INTERVAL {
            return Err(SyncError::config(format!(
                "sync interval cannot be lower than {} minutes",
                MIN_SYNC_INTERVAL.as_secs() / 60
            )));
        }
        if self.api_base_url.is_empty() {
            return Err(SyncError::config("api base url cannot be empty"));
        }
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_config_builder() {
        let config = SyncConfig::new("/etc/groupmirror/sa.json")
            .with_customer_id("C0123abc")
            .with_domain("example.com")
            .with_subject("admin@example.com")
            .with_sync_interval_minutes(15)
            .with_storage_location("/var/lib/groupmirror")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.credentials_path, PathBuf::from("/etc/groupmirror/sa.json"));
        assert_eq!(config.customer_id, "C0123abc");
        assert_eq!(config.domain.as_deref(), Some("example.com"));
        assert_eq!(config.subject.as_deref(), Some("admin@example.com"));
        assert_eq!(config.sync_interval, Duration::from_secs(900));
        assert_eq!(
            config.storage_location,
            Some(PathBuf::from("/var/lib/groupmirror"))
        );
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults() {
        let config = SyncConfig::new("sa.json");
        assert_eq!(config.customer_id, DEFAULT_CUSTOMER_ID);
        assert_eq!(config.sync_interval, DEFAULT_SYNC_INTERVAL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.domain.is_none());
        assert!(config.storage_location.is_none());
    }

    #[test]
    fn empty_domain_and_subject_are_unset() {
        let config = SyncConfig::new("sa.json").with_domain("").with_subject("");
        assert!(config.domain.is_none());
        assert!(config.subject.is_none());
    }

    #[test]
    fn rejects_missing_credentials() {
        let err = SyncConfig::new("").validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn rejects_missing_customer_id() {
        let err = SyncConfig::new("sa.json")
            .with_customer_id("")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("customer id"));
    }

    #[test]
    fn rejects_short_interval() {
        let err = SyncConfig::new("sa.json")
            .with_sync_interval_minutes(4)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("5 minutes"));

        assert!(SyncConfig::new("sa.json")
            .with_sync_interval_minutes(5)
            .validate()
            .is_ok());
    }
}
