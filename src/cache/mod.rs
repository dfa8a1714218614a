//! Snapshot cache subsystem.
//!
//! # Data Flow
//! ```text
//! refresher.rs (background, fixed cadence)
//!     → upstream fetch → freshness.rs write
//!
//! service.rs get_cached_or_fresh (request handlers)
//!     → freshness.rs read
//!     → stale or empty: single-flight on-demand fetch → write
//!     → fetch failed: stale entry flagged, or Unavailable
//! ```

pub mod freshness;
pub mod refresher;
pub mod service;

pub use freshness::{CacheEntry, CacheRead, FreshnessCache};
pub use refresher::{BackgroundRefresher, RefreshState};
pub use service::{CachedSnapshot, SnapshotService, Unavailable};
