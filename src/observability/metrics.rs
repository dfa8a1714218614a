//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tipper_fetch_attempts_total` (counter): HTTP attempts by status (`error` for network failures)
//! - `tipper_fetch_total` (counter): snapshot fetches by outcome
//! - `tipper_upstream_connected` (gauge): 1=connected, 0=disconnected
//! - `tipper_snapshot_records` (gauge): records in the current snapshot
//! - `tipper_cache_reads_total` (counter): reads by result (fresh, stale, empty)

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_attempt(status: Option<u16>) {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    counter!("tipper_fetch_attempts_total", "status" => status).increment(1);
}

pub fn record_fetch(outcome: &'static str) {
    counter!("tipper_fetch_total", "outcome" => outcome).increment(1);
}

pub fn record_connected(connected: bool) {
    gauge!("tipper_upstream_connected").set(if connected { 1.0 } else { 0.0 });
}

pub fn record_snapshot_size(records: usize) {
    gauge!("tipper_snapshot_records").set(records as f64);
}

pub fn record_cache_read(result: &'static str) {
    counter!("tipper_cache_reads_total", "result" => result).increment(1);
}
