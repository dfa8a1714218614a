//! Background snapshot refresher.
//!
//! # States
//! ```text
//! WaitingForConnectivity --probe ok--> Fetching --done--> Sleeping --interval--> WaitingForConnectivity
//!          ^    |
//!          +----+ probe failed: wait connectivity_retry, probe again
//! ```
//!
//! A failed fetch is logged and the loop carries on; there is no failure
//! ceiling. The shutdown signal is honored at every probe, fetch and sleep.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::cache::freshness::FreshnessCache;
use crate::config::RefresherConfig;
use crate::health::ConnectivityProbe;
use crate::upstream::SnapshotSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    WaitingForConnectivity,
    Fetching,
    Sleeping,
    Stopped,
}

/// Perpetual task keeping the cache warm.
pub struct BackgroundRefresher<P, S> {
    probe: P,
    source: Arc<S>,
    cache: Arc<FreshnessCache>,
    fetch_interval: Duration,
    connectivity_retry: Duration,
    state_tx: watch::Sender<RefreshState>,
}

impl<P, S> BackgroundRefresher<P, S>
where
    P: ConnectivityProbe,
    S: SnapshotSource,
{
    pub fn new(config: &RefresherConfig, probe: P, source: Arc<S>, cache: Arc<FreshnessCache>) -> Self {
        let (state_tx, _) = watch::channel(RefreshState::WaitingForConnectivity);
        Self {
            probe,
            source,
            cache,
            fetch_interval: Duration::from_secs(config.fetch_interval_secs),
            connectivity_retry: Duration::from_secs(config.connectivity_retry_secs),
            state_tx,
        }
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<RefreshState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: RefreshState) {
        self.state_tx.send_replace(state);
    }

    /// Run until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            fetch_interval_secs = self.fetch_interval.as_secs(),
            connectivity_retry_secs = self.connectivity_retry.as_secs(),
            "Background refresher starting"
        );

        while self.cycle(&mut shutdown).await.is_some() {}

        self.set_state(RefreshState::Stopped);
        tracing::info!("Background refresher received shutdown signal, exiting loop");
    }

    /// One wait → fetch → sleep cycle. `None` means shutdown was requested.
    async fn cycle(&self, shutdown: &mut broadcast::Receiver<()>) -> Option<()> {
        self.set_state(RefreshState::WaitingForConnectivity);
        loop {
            let reachable = tokio::select! {
                reachable = self.probe.is_reachable() => reachable,
                _ = shutdown.recv() => return None,
            };
            if reachable {
                break;
            }
            tracing::debug!(retry_in = ?self.connectivity_retry, "Network unreachable, waiting");
            sleep_or_shutdown(self.connectivity_retry, shutdown).await?;
        }

        self.set_state(RefreshState::Fetching);
        let result = tokio::select! {
            result = self.source.fetch_snapshot() => result,
            _ = shutdown.recv() => return None,
        };
        match result {
            Ok(snapshot) => {
                self.cache.write(snapshot);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Background refresh failed, keeping previous snapshot");
            }
        }

        self.set_state(RefreshState::Sleeping);
        sleep_or_shutdown(self.fetch_interval, shutdown).await
    }
}

async fn sleep_or_shutdown(duration: Duration, shutdown: &mut broadcast::Receiver<()>) -> Option<()> {
    tokio::select! {
        _ = tokio::time::sleep(duration) => Some(()),
        _ = shutdown.recv() => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{FetchError, Snapshot};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct FakeProbe {
        up: Arc<AtomicBool>,
        probes: Arc<AtomicU32>,
    }

    impl ConnectivityProbe for FakeProbe {
        async fn is_reachable(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.up.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct FakeSource {
        calls: AtomicU32,
        fail: AtomicBool,
    }

    impl SnapshotSource for FakeSource {
        async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(FetchError::Status { status: 500 });
            }
            Ok(Snapshot::from_json(format!(r#"{{"fetch":{}}}"#, n).as_bytes()).unwrap())
        }
    }

    struct Harness {
        up: Arc<AtomicBool>,
        probes: Arc<AtomicU32>,
        source: Arc<FakeSource>,
        cache: Arc<FreshnessCache>,
        shutdown: broadcast::Sender<()>,
        state: watch::Receiver<RefreshState>,
        handle: tokio::task::JoinHandle<()>,
    }

    fn start(network_up: bool) -> Harness {
        let up = Arc::new(AtomicBool::new(network_up));
        let probes = Arc::new(AtomicU32::new(0));
        let source = Arc::new(FakeSource::default());
        let cache = Arc::new(FreshnessCache::new());
        let probe = FakeProbe {
            up: up.clone(),
            probes: probes.clone(),
        };

        let refresher = BackgroundRefresher::new(&RefresherConfig::default(), probe, source.clone(), cache.clone());
        let state = refresher.state();
        let (shutdown, rx) = broadcast::channel(1);
        let handle = tokio::spawn(refresher.run(rx));

        Harness { up, probes, source, cache, shutdown, state, handle }
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_never_fetches() {
        let h = start(false);

        tokio::time::sleep(Duration::from_secs(12)).await;

        assert_eq!(h.probes.load(Ordering::SeqCst), 3, "probes at t=0, 5, 10");
        assert_eq!(h.source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(*h.state.borrow(), RefreshState::WaitingForConnectivity);
        assert!(h.cache.latest().is_none());

        h.shutdown.send(()).unwrap();
        h.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_on_cadence() {
        let h = start(true);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(h.source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*h.state.borrow(), RefreshState::Sleeping);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(h.source.calls.load(Ordering::SeqCst), 2);
        let entry = h.cache.latest().unwrap();
        assert_eq!(entry.snapshot, Snapshot::from_json(br#"{"fetch":2}"#).unwrap());

        h.shutdown.send(()).unwrap();
        h.handle.await.unwrap();
        assert_eq!(*h.state.borrow(), RefreshState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_keep_previous_snapshot_and_loop() {
        let h = start(true);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(h.cache.latest().is_some());

        h.source.fail.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(90)).await;

        assert_eq!(h.source.calls.load(Ordering::SeqCst), 4);
        let entry = h.cache.latest().unwrap();
        assert_eq!(entry.snapshot, Snapshot::from_json(br#"{"fetch":1}"#).unwrap());
        assert!(!h.handle.is_finished());

        h.shutdown.send(()).unwrap();
        h.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumes_when_network_returns() {
        let h = start(false);

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(h.source.calls.load(Ordering::SeqCst), 0);

        h.up.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.source.calls.load(Ordering::SeqCst), 1);

        h.shutdown.send(()).unwrap();
        h.handle.await.unwrap();
    }
}
