//! Connection health subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream fetch outcome (upstream::client)
//!     → state.rs mark_connected / mark_disconnected
//!
//! Connectivity probe (probe.rs)
//!     → state.rs mark_disconnected on failure
//!
//! Readers (service, HTTP surface)
//!     → state.rs snapshot()
//! ```

pub mod probe;
pub mod state;

pub use probe::{ConnectivityMonitor, ConnectivityProbe};
pub use state::{ConnectionHealth, HealthTracker, LinkState};
