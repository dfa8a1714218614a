//! Upstream connection health.
//!
//! # States
//! - Unknown: nothing attempted yet
//! - Connected: the last upstream fetch succeeded
//! - Disconnected: the last fetch or connectivity probe failed
//!
//! # State Transitions
//! ```text
//! any → Connected: fetch succeeded (last_success_at = now, failures reset)
//! any → Disconnected: fetch or probe failed (consecutive_failures += 1)
//! ```
//!
//! No hysteresis: the readout always reflects the most recent outcome.

use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Unknown,
    Connected,
    Disconnected,
}

/// Point-in-time health readout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionHealth {
    pub state: LinkState,
    /// Last successful fetch (seconds since epoch).
    pub last_success_at: Option<u64>,
    /// Reason for the most recent failure, cleared on success.
    pub last_failure: Option<String>,
    pub consecutive_failures: u32,
}

impl ConnectionHealth {
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self {
            state: LinkState::Unknown,
            last_success_at: None,
            last_failure: None,
            consecutive_failures: 0,
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Shared, lock-free holder of the current [`ConnectionHealth`].
///
/// Every update swaps in a complete new value, so readers never see a
/// half-applied transition.
#[derive(Debug, Default)]
pub struct HealthTracker {
    inner: ArcSwap<ConnectionHealth>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current readout.
    pub fn snapshot(&self) -> ConnectionHealth {
        self.inner.load().as_ref().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.load().is_connected()
    }

    /// Record a successful upstream fetch.
    pub fn mark_connected(&self) {
        let now = now_secs();
        let previous = self.inner.swap(Arc::new(ConnectionHealth {
            state: LinkState::Connected,
            last_success_at: Some(now),
            last_failure: None,
            consecutive_failures: 0,
        }));
        if previous.state != LinkState::Connected {
            tracing::info!("Upstream connection established");
        }
        metrics::record_connected(true);
    }

    /// Record a failed fetch or probe.
    pub fn mark_disconnected(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let previous = self.inner.rcu(|current| ConnectionHealth {
            state: LinkState::Disconnected,
            last_success_at: current.last_success_at,
            last_failure: Some(reason.clone()),
            consecutive_failures: current.consecutive_failures.saturating_add(1),
        });
        if previous.state != LinkState::Disconnected {
            tracing::warn!(reason = %reason, "Upstream connection lost");
        }
        metrics::record_connected(false);
    }
}
