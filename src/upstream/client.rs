//! Authenticated upstream client.
//!
//! # Responsibilities
//! - Acquire a bearer token, then fetch the record set with it
//! - Normalize the body to a [`Snapshot`]
//! - Record every outcome into the shared [`HealthTracker`]

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Credentials, RetryPolicy, UpstreamConfig};
use crate::health::HealthTracker;
use crate::observability::metrics;
use crate::resilience::{RetryingTransport, TransportError};
use crate::upstream::error::{FetchError, FetchStage};
use crate::upstream::token::TokenProvider;
use crate::upstream::types::Snapshot;

/// Anything that can produce a complete snapshot.
pub trait SnapshotSource: Send + Sync {
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}

/// Client for the tipper-room data endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    transport: Arc<RetryingTransport>,
    tokens: TokenProvider,
    credentials: Credentials,
    data_url: String,
    company: String,
    warehouse: String,
    health: Arc<HealthTracker>,
}

impl UpstreamClient {
    pub fn new(
        config: &UpstreamConfig,
        credentials: Credentials,
        policy: RetryPolicy,
        health: Arc<HealthTracker>,
    ) -> Result<Self, TransportError> {
        let transport = Arc::new(RetryingTransport::new(
            policy,
            Duration::from_secs(config.request_timeout_secs),
        )?);
        Ok(Self::with_transport(config, credentials, transport, health))
    }

    /// Build on a shared transport.
    pub fn with_transport(
        config: &UpstreamConfig,
        credentials: Credentials,
        transport: Arc<RetryingTransport>,
        health: Arc<HealthTracker>,
    ) -> Self {
        Self {
            tokens: TokenProvider::new(transport.clone(), config.token_url.clone()),
            transport,
            credentials,
            data_url: config.data_url.clone(),
            company: config.company.clone(),
            warehouse: config.warehouse.clone(),
            health,
        }
    }

    async fn try_fetch(&self) -> Result<Snapshot, FetchError> {
        let token = self.tokens.acquire_token(&self.credentials).await?;

        let request = self
            .transport
            .client()
            .get(&self.data_url)
            .bearer_auth(token.secret())
            .query(&[("company", self.company.as_str()), ("warehouse", self.warehouse.as_str())])
            .build()
            .map_err(|e| FetchError::transport(FetchStage::Data, TransportError::Build(e)))?;

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| FetchError::transport(FetchStage::Data, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        Snapshot::from_json(&body).map_err(|e| FetchError::BadPayload(e.to_string()))
    }
}

impl SnapshotSource for UpstreamClient {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let start = Instant::now();

        match self.try_fetch().await {
            Ok(snapshot) => {
                self.health.mark_connected();
                metrics::record_fetch("success");
                tracing::info!(
                    records = snapshot.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Fetched snapshot"
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.health.mark_disconnected(e.to_string());
                metrics::record_fetch(e.kind());
                tracing::error!(
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Snapshot fetch failed"
                );
                Err(e)
            }
        }
    }
}
