//! Startup orchestration.
//!
//! Subsystems initialize in dependency order: health → cache → upstream
//! client → service → refresher → HTTP. Any startup error is fatal; runtime
//! fetch errors never are.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::cache::{BackgroundRefresher, FreshnessCache, SnapshotService};
use crate::config::AppConfig;
use crate::health::{ConnectivityMonitor, HealthTracker};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::resilience::TransportError;
use crate::upstream::UpstreamClient;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] TransportError),

    #[error("failed to build connectivity probe: {0}")]
    Probe(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the service until `shutdown` fires.
pub async fn run(config: AppConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let health = Arc::new(HealthTracker::new());
    let cache = Arc::new(FreshnessCache::new());

    let client = Arc::new(UpstreamClient::new(
        &config.upstream,
        config.credentials.clone(),
        config.retry.clone(),
        health.clone(),
    )?);
    tracing::info!(
        data_url = %config.upstream.data_url,
        company = %config.upstream.company,
        warehouse = %config.upstream.warehouse,
        max_attempts = config.retry.max_attempts,
        "Upstream client ready"
    );

    let listener = TcpListener::bind(&config.http.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.http.bind_address.clone(),
            source,
        })?;

    let service = Arc::new(
        SnapshotService::new(cache.clone(), client.clone(), health.clone())
            .with_fetch_timeout(Duration::from_secs(config.cache.fetch_timeout_secs)),
    );

    let refresher_handle = if config.refresher.enabled {
        let monitor = ConnectivityMonitor::new(&config.connectivity, health.clone())?;
        let refresher = BackgroundRefresher::new(&config.refresher, monitor, client, cache);
        Some(tokio::spawn(refresher.run(shutdown.subscribe())))
    } else {
        tracing::info!("Background refresher disabled, serving on-demand fetches only");
        None
    };

    let server = HttpServer::new(service, &config.http, &config.cache);
    let served = server.run(listener, shutdown.subscribe()).await;

    // The server may also stop on its own error; make sure the refresher follows.
    shutdown.trigger();
    if let Some(handle) = refresher_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Background refresher task panicked");
        }
    }

    served?;
    Ok(())
}
