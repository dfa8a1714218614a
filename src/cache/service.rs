//! Read API for the presentation layer.
//!
//! Callers only ever see a snapshot (possibly flagged stale) or
//! [`Unavailable`]; fetch errors stop here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::freshness::{CacheEntry, CacheRead, FreshnessCache};
use crate::health::{ConnectionHealth, HealthTracker};
use crate::upstream::{SnapshotSource, UpstreamClient};

/// Upper bound on one on-demand fetch, including every retry.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(90);

/// No snapshot has ever been captured and the on-demand fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unavailable, reconnecting")]
pub struct Unavailable;

/// A snapshot handed to a reader.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub entry: Arc<CacheEntry>,
    /// Older than requested; served because a refresh just failed.
    pub stale: bool,
}

/// Cache + on-demand fetch + health readout, shared by all request handlers.
pub struct SnapshotService<S = UpstreamClient> {
    cache: Arc<FreshnessCache>,
    source: Arc<S>,
    health: Arc<HealthTracker>,
    /// Serializes on-demand fetches so a burst of stale reads costs one fetch.
    refresh_gate: Mutex<()>,
    /// Bumped after every on-demand attempt, whatever its outcome.
    attempts: AtomicU64,
    fetch_timeout: Duration,
}

impl<S: SnapshotSource> SnapshotService<S> {
    pub fn new(cache: Arc<FreshnessCache>, source: Arc<S>, health: Arc<HealthTracker>) -> Self {
        Self {
            cache,
            source,
            health,
            refresh_gate: Mutex::new(()),
            attempts: AtomicU64::new(0),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Cap each on-demand fetch. Keep it below the HTTP request timeout.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Serve the cached snapshot if younger than `max_age`, else fetch now.
    ///
    /// Callers that queued behind an in-flight fetch share its outcome: if it
    /// failed they get the previous snapshot flagged stale (or [`Unavailable`])
    /// without starting another fetch.
    pub async fn get_cached_or_fresh(&self, max_age: Duration) -> Result<CachedSnapshot, Unavailable> {
        if let CacheRead::Fresh(entry) = self.cache.read(max_age) {
            return Ok(CachedSnapshot { entry, stale: false });
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited.
        if let CacheRead::Fresh(entry) = self.cache.read(max_age) {
            return Ok(CachedSnapshot { entry, stale: false });
        }
        if self.attempts.load(Ordering::Acquire) != seen {
            return self.fall_back("Shared on-demand fetch failed");
        }

        let outcome = tokio::time::timeout(self.fetch_timeout, self.source.fetch_snapshot()).await;
        self.attempts.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Ok(Ok(snapshot)) => Ok(CachedSnapshot {
                entry: self.cache.write(snapshot),
                stale: false,
            }),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "On-demand fetch failed");
                self.fall_back("On-demand fetch failed")
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.fetch_timeout, "On-demand fetch timed out");
                self.health
                    .mark_disconnected(format!("fetch timed out after {}s", self.fetch_timeout.as_secs()));
                self.fall_back("On-demand fetch timed out")
            }
        }
    }

    /// Previous snapshot flagged stale, or [`Unavailable`] if there is none.
    fn fall_back(&self, reason: &'static str) -> Result<CachedSnapshot, Unavailable> {
        match self.cache.latest() {
            Some(entry) => {
                tracing::debug!(reason, age_secs = entry.age().as_secs(), "Serving stale snapshot");
                Ok(CachedSnapshot { entry, stale: true })
            }
            None => {
                tracing::debug!(reason, "No snapshot cached");
                Err(Unavailable)
            }
        }
    }

    pub fn get_connection_health(&self) -> ConnectionHealth {
        self.health.snapshot()
    }
}
