//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the tipper-room cache.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream token and data endpoints.
    pub upstream: UpstreamConfig,

    /// OAuth client and resource-owner credentials.
    pub credentials: Credentials,

    /// Retry policy shared by the token and data requests.
    pub retry: RetryPolicy,

    /// Snapshot staleness settings.
    pub cache: CacheConfig,

    /// Background refresh cadence.
    pub refresher: RefresherConfig,

    /// Reachability probe settings.
    pub connectivity: ConnectivityConfig,

    /// JSON read surface.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream endpoints and fixed query parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// OAuth token endpoint (password grant).
    pub token_url: String,

    /// Data endpoint returning the tipper-room records.
    pub data_url: String,

    /// Company identifier sent as the `company` query parameter.
    pub company: String,

    /// Warehouse identifier sent as the `warehouse` query parameter.
    pub warehouse: String,

    /// Per-request timeout for authenticated calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            token_url: "http://localhost:8000/oauth/token".to_string(),
            data_url: "http://localhost:8000/api/tipper-room".to_string(),
            company: "PLL".to_string(),
            warehouse: "GREER".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Client and resource-owner credentials for the password grant.
///
/// Immutable once loaded. `Debug` never prints the secrets.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Status codes treated as transient.
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    /// Whether `status` is in the retryable set.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

/// Snapshot staleness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum age of a snapshot served as fresh, in seconds.
    pub max_age_secs: u64,

    /// Deadline for one on-demand fetch, retries included. Must stay below
    /// `http.request_timeout_secs` so readers get the stale fallback, not a timeout.
    pub fetch_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 60,
            fetch_timeout_secs: 90,
        }
    }
}

/// Background refresher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefresherConfig {
    /// Run the background refresher.
    pub enabled: bool,

    /// Sleep between fetches, in seconds.
    pub fetch_interval_secs: u64,

    /// Sleep between failed connectivity probes, in seconds.
    pub connectivity_retry_secs: u64,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fetch_interval_secs: 30,
            connectivity_retry_secs: 5,
        }
    }
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Highly available address probed to detect network loss.
    pub probe_url: String,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,

    /// Skip certificate validation for the probe (never for upstream calls).
    pub accept_invalid_certs: bool,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_url: "https://www.google.com".to_string(),
            timeout_secs: 3,
            accept_invalid_certs: true,
        }
    }
}

/// HTTP read surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds. Covers an on-demand fetch.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) used when RUST_LOG is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.cache.max_age_secs, 60);
        assert!(config.cache.fetch_timeout_secs < config.http.request_timeout_secs);
        assert_eq!(config.refresher.fetch_interval_secs, 30);
        assert_eq!(config.refresher.connectivity_retry_secs, 5);
        assert_eq!(config.connectivity.timeout_secs, 3);
        assert!(config.retry.is_retryable_status(503));
        assert!(!config.retry.is_retryable_status(404));
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [upstream]
            company = "ACME"

            [retry]
            max_attempts = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.company, "ACME");
        assert_eq!(config.upstream.warehouse, "GREER");
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials {
            client_id: "id".into(),
            client_secret: "s3cret".into(),
            username: "user".into(),
            password: "hunter2".into(),
        };
        let out = format!("{:?}", creds);
        assert!(!out.contains("s3cret"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains("user"));
    }
}
