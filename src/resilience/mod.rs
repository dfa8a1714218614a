//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Token or data request:
//!     → retries.rs (execute, classify status / network error)
//!     → On transient failure: backoff.rs (exponential delay + jitter), replay
//!     → On exhaustion: TransportError::Exhausted with the last status
//! ```
//!
//! # Design Decisions
//! - Every authenticated call has a per-request timeout (set on the client)
//! - The retry ceiling is the effective timeout envelope of a fetch
//! - The same policy governs token and data requests

pub mod backoff;
pub mod retries;

pub use retries::{RetryingTransport, TransportError};
