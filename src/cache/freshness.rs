//! Time-bounded snapshot holder.
//!
//! # Design Decisions
//! - The entry is swapped as one `Arc`, so a reader holds either the old or the
//!   new complete snapshot, never a mix
//! - Reads never block the writer and vice versa
//! - Ages use the Tokio clock so paused-time tests can drive staleness

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

use crate::observability::metrics;
use crate::upstream::Snapshot;

/// A snapshot plus the moment it was captured.
#[derive(Debug)]
pub struct CacheEntry {
    pub snapshot: Snapshot,
    pub captured_at: Instant,
    /// Wall-clock capture time (seconds since epoch), for display.
    pub captured_at_unix: u64,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }
}

/// Result of a freshness-checked read.
#[derive(Debug, Clone)]
pub enum CacheRead {
    /// Younger than the requested maximum age.
    Fresh(Arc<CacheEntry>),
    /// Present but too old; the caller decides whether to serve it.
    Stale(Arc<CacheEntry>),
    /// Nothing captured yet.
    Empty,
}

/// Single-slot snapshot cache.
#[derive(Debug, Default)]
pub struct FreshnessCache {
    entry: ArcSwapOption<CacheEntry>,
}

impl FreshnessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current entry, classified against `max_age`.
    pub fn read(&self, max_age: Duration) -> CacheRead {
        let result = match self.entry.load_full() {
            Some(entry) if entry.age() < max_age => CacheRead::Fresh(entry),
            Some(entry) => CacheRead::Stale(entry),
            None => CacheRead::Empty,
        };
        metrics::record_cache_read(match result {
            CacheRead::Fresh(_) => "fresh",
            CacheRead::Stale(_) => "stale",
            CacheRead::Empty => "empty",
        });
        result
    }

    /// Latest entry regardless of age.
    pub fn latest(&self) -> Option<Arc<CacheEntry>> {
        self.entry.load_full()
    }

    /// Replace the held snapshot, stamping it with the current time.
    pub fn write(&self, snapshot: Snapshot) -> Arc<CacheEntry> {
        let records = snapshot.len();
        let entry = Arc::new(CacheEntry {
            snapshot,
            captured_at: Instant::now(),
            captured_at_unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        });
        self.entry.store(Some(entry.clone()));
        metrics::record_snapshot_size(records);
        tracing::debug!(records, "Snapshot cached");
        entry
    }
}
