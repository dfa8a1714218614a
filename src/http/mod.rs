//! HTTP read surface.
//!
//! # Data Flow
//! ```text
//! GET /api/records → handlers.rs → SnapshotService::get_cached_or_fresh
//! GET /api/health  → handlers.rs → SnapshotService::get_connection_health
//! GET /healthz     → "ok"
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
