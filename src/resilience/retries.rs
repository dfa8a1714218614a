//! Retrying HTTP transport.
//!
//! # Responsibilities
//! - Execute a request, replaying it on transient failures
//! - Back off exponentially (with jitter) between attempts
//! - Surface exhaustion with the last observed status
//!
//! # Design Decisions
//! - Connection errors are always retryable; statuses only if listed in the policy
//! - A non-retryable status is a successful transport call; the caller judges it
//! - No shared state is touched, so one transport can serve any number of callers

use std::time::Duration;
use thiserror::Error;

use crate::config::RetryPolicy;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Failures of the transport itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Every attempt hit a retryable status or a network error.
    #[error("gave up after {attempts} attempts (last status: {}, last error: {})",
        .last_status.map(|s| s.to_string()).unwrap_or_else(|| "none".into()),
        .last_error.as_deref().unwrap_or("none"))]
    Exhausted {
        attempts: u32,
        last_status: Option<u16>,
        last_error: Option<String>,
    },

    /// The request body is a stream and cannot be replayed.
    #[error("request cannot be replayed for retry")]
    Unreplayable,

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Build(#[source] reqwest::Error),
}

/// HTTP client wrapper applying a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl RetryingTransport {
    /// Build a transport with a certificate-validating client and per-request timeout.
    pub fn new(policy: RetryPolicy, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self::with_client(client, policy))
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// The underlying client, for building requests.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send `request`, retrying up to `max_attempts` total attempts.
    pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, TransportError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_status = None;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let req = request.try_clone().ok_or(TransportError::Unreplayable)?;

            match self.client.execute(req).await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    metrics::record_attempt(Some(status));

                    if !self.policy.is_retryable_status(status) {
                        return Ok(response);
                    }
                    tracing::warn!(
                        url = %request.url(),
                        attempt,
                        max_attempts,
                        status,
                        "Transient upstream status"
                    );
                    last_status = Some(status);
                    last_error = None;
                }
                Err(e) if e.is_builder() => return Err(TransportError::Build(e)),
                Err(e) => {
                    metrics::record_attempt(None);
                    tracing::warn!(
                        url = %request.url(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "Upstream request failed"
                    );
                    last_status = None;
                    last_error = Some(e.to_string());
                }
            }

            if attempt < max_attempts {
                let delay = calculate_backoff(attempt, &self.policy);
                tracing::debug!(attempt, delay = ?delay, "Backing off before retry");
                tokio::time::sleep(delay).await;
            }
        }

        Err(TransportError::Exhausted {
            attempts: max_attempts,
            last_status,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_display() {
        let err = TransportError::Exhausted {
            attempts: 5,
            last_status: Some(503),
            last_error: None,
        };
        assert_eq!(
            err.to_string(),
            "gave up after 5 attempts (last status: 503, last error: none)"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_exhausts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay_ms: 1,
            max_delay_ms: 1,
            ..RetryPolicy::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let transport = RetryingTransport::with_client(client, policy);
        // Port 9 (discard) is closed on test hosts.
        let request = transport.client().get("http://127.0.0.1:9/").build().unwrap();

        match transport.send(request).await {
            Err(TransportError::Exhausted { attempts, last_status, last_error }) => {
                assert_eq!(attempts, 2);
                assert!(last_status.is_none());
                assert!(last_error.is_some());
            }
            other => panic!("expected exhaustion, got {:?}", other.map(|r| r.status())),
        }
    }
}
