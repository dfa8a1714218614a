//! Tipper-room snapshot cache.
//!
//! Serves one shared, time-bounded snapshot of warehouse tipper-room records
//! to many concurrent readers, refreshed from an authenticated, unreliable
//! upstream API.

pub mod cache;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use cache::{SnapshotService, Unavailable};
pub use config::AppConfig;
pub use health::ConnectionHealth;
pub use lifecycle::Shutdown;
pub use upstream::Snapshot;
