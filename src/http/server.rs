//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router over the snapshot service
//! - Wire up middleware (tracing, request timeout)
//! - Serve until the shared shutdown signal fires

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::cache::SnapshotService;
use crate::config::{CacheConfig, HttpConfig};
use crate::http::handlers::{get_health, get_records, liveness};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SnapshotService>,
    pub default_max_age: Duration,
}

/// JSON read surface.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(service: Arc<SnapshotService>, http: &HttpConfig, cache: &CacheConfig) -> Self {
        let state = AppState {
            service,
            default_max_age: Duration::from_secs(cache.max_age_secs),
        };
        Self {
            router: Self::build_router(state, Duration::from_secs(http.request_timeout_secs)),
        }
    }

    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/api/records", get(get_records))
            .route("/api/health", get(get_health))
            .route("/healthz", get(liveness))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
