//! Network reachability probing.
//!
//! # Responsibilities
//! - Tell "network is down" apart from "upstream service is down"
//! - Gate the background refresher so it does not burn retries offline
//!
//! # Design Decisions
//! - Probes a highly available third-party address, not the upstream itself
//! - Any response at all (even 4xx/5xx) counts as reachable
//! - Certificate validation may be skipped for this probe only; the
//!   authenticated upstream client always validates
//! - Never fails: errors and timeouts read as unreachable

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConnectivityConfig;
use crate::health::state::HealthTracker;

/// Anything that can answer "is the network up?".
pub trait ConnectivityProbe: Send + Sync {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}

/// HTTP-based reachability probe.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    client: reqwest::Client,
    probe_url: String,
    health: Arc<HealthTracker>,
}

impl ConnectivityMonitor {
    pub fn new(config: &ConnectivityConfig, health: Arc<HealthTracker>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self::with_client(client, config.probe_url.clone(), health))
    }

    /// Wrap a preconfigured client.
    pub fn with_client(client: reqwest::Client, probe_url: String, health: Arc<HealthTracker>) -> Self {
        Self {
            client,
            probe_url,
            health,
        }
    }
}

impl ConnectivityProbe for ConnectivityMonitor {
    async fn is_reachable(&self) -> bool {
        match self.client.get(&self.probe_url).send().await {
            Ok(response) => {
                tracing::debug!(url = %self.probe_url, status = %response.status(), "Connectivity probe answered");
                true
            }
            Err(e) => {
                tracing::warn!(url = %self.probe_url, error = %e, "Connectivity probe failed");
                self.health.mark_disconnected(format!("network unreachable: {}", e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_marks_disconnected() {
        let health = Arc::new(HealthTracker::new());
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let monitor = ConnectivityMonitor::with_client(client, "http://127.0.0.1:9/".to_string(), health.clone());

        assert!(!monitor.is_reachable().await);
        assert!(!health.is_connected());
        assert_eq!(health.snapshot().consecutive_failures, 1);
    }
}
