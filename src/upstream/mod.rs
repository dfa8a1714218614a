//! Upstream API subsystem.
//!
//! # Data Flow
//! ```text
//! fetch_snapshot()
//!     → token.rs (password grant via RetryingTransport)
//!     → client.rs (bearer GET via RetryingTransport)
//!     → types.rs (array or single object → Snapshot)
//!     → health::HealthTracker (connected / disconnected)
//! ```

pub mod client;
pub mod error;
pub mod token;
pub mod types;

pub use client::{SnapshotSource, UpstreamClient};
pub use error::{AuthError, FetchError, FetchStage};
pub use token::{BearerToken, TokenProvider};
pub use types::{Record, Scalar, Snapshot};
