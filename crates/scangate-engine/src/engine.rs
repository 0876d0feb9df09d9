//! Engine: wires the rate gate, catalog, workers, feeder, and progress
//! reporter into one orchestrated scan.
//!
//! Grounded on the teacher's `prtip-scanner::scheduler::ScanScheduler`,
//! which plays the same top-level "own every subsystem, run one scan,
//! report progress, then stop" role — restructured around a fixed
//! startup/teardown order instead of the teacher's scheduler loop.

use crate::executor::Executor;
use crate::feeder;
use crate::probe_catalog::ProbeCatalog;
use crate::probe_stats::{ProbeStats, ProbeStatsTable};
use crate::progress_reporter;
use crate::rate_gate::RateGate;
use crate::retry::RetryLoop;
use crate::worker::{self, SharedJobQueue};
use parking_lot::Mutex;
use scangate_core::{EngineConfig, Error, Event, Protocol, Result, ScanTarget};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bounded capacity of the event bus and each protocol's job queue.
/// Deliberate backpressure: a burst of targets can't outrun the workers
/// publishing results.
const CHANNEL_CAPACITY: usize = 1024;

pub struct Engine {
    config: Arc<EngineConfig>,
    catalog: Arc<ProbeCatalog>,
    stats: Arc<ProbeStatsTable>,
    rate_gate: Arc<RateGate>,
    event_tx: Mutex<Option<mpsc::Sender<Event>>>,
}

impl Engine {
    /// Build a new engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let rate_gate = Arc::new(RateGate::new(config.rate_limit));
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(ProbeCatalog::new()),
            stats: Arc::new(ProbeStatsTable::new()),
            rate_gate,
            event_tx: Mutex::new(None),
        })
    }

    /// Register a custom UDP probe payload for `port`, overriding the
    /// built-in catalog entry if any. Must be called before `scan_*` —
    /// the catalog is treated as immutable once a scan starts.
    pub fn add_custom_udp_probe(&self, port: u16, payload: Vec<u8>) {
        self.catalog.register(port, payload);
    }

    /// Snapshot of per-port attempt/response/success counters collected so
    /// far.
    pub fn probe_stats(&self) -> HashMap<u16, ProbeStats> {
        self.stats.snapshot()
    }

    /// Open the event bus for the next scan. Must be called before
    /// `scan_targets`/`scan_range`; the returned receiver observes every
    /// `Event` that scan publishes, and closes once the scan finishes.
    pub fn events(&self) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        *self.event_tx.lock() = Some(tx);
        rx
    }

    /// Convenience wrapper: scan one host over an explicit port list.
    pub async fn scan_range(&self, cancel: CancellationToken, host: impl Into<String>, ports: Vec<u16>) -> Result<()> {
        self.scan_targets(cancel, vec![ScanTarget::new(host, ports)]).await
    }

    /// Run one scan to completion (or until cancelled), publishing every
    /// result on the bus handed out by the last call to `events()`.
    pub async fn scan_targets(&self, cancel: CancellationToken, targets: Vec<ScanTarget>) -> Result<()> {
        let event_tx = self
            .event_tx
            .lock()
            .take()
            .ok_or_else(|| Error::Config("events() must be called before scanning".into()))?;

        let wants_tcp = self.config.protocols.wants_tcp();
        let wants_udp = self.config.protocols.wants_udp();
        let per_target: usize = targets.iter().map(ScanTarget::port_count).sum();
        let total = (per_target * (wants_tcp as usize + wants_udp as usize)) as u64;

        info!(total, wants_tcp, wants_udp, "starting scan");

        if total == 0 {
            debug!("no jobs to run, closing bus immediately");
            drop(event_tx);
            return Ok(());
        }

        let completed = Arc::new(AtomicU64::new(0));
        let executor = Arc::new(Executor::new(self.config.clone(), self.catalog.clone(), self.stats.clone()));
        let retry = Arc::new(RetryLoop::new(executor, self.rate_gate.clone(), self.config.clone()));

        let progress_handle = tokio::spawn(progress_reporter::run(
            total,
            completed.clone(),
            event_tx.clone(),
            cancel.clone(),
        ));

        let mut workers = JoinSet::new();
        let tcp_tx = wants_tcp.then(|| {
            spawn_pool(
                &mut workers,
                Protocol::Tcp,
                worker::tcp_worker_count(self.config.workers),
                retry.clone(),
                event_tx.clone(),
                completed.clone(),
                cancel.clone(),
            )
        });
        let udp_tx = wants_udp.then(|| {
            spawn_pool(
                &mut workers,
                Protocol::Udp,
                worker::udp_worker_count(worker::tcp_worker_count(self.config.workers), self.config.udp_worker_ratio),
                retry.clone(),
                event_tx.clone(),
                completed.clone(),
                cancel.clone(),
            )
        });

        // Drop our own clone before feeding: the feeder's sends should race
        // only against the workers' sends, not an extra unused handle that
        // would otherwise keep the bus open after everyone else is done.
        drop(event_tx);

        feeder::feed(&targets, tcp_tx, udp_tx, &cancel).await;

        while workers.join_next().await.is_some() {}

        if let Err(err) = progress_handle.await {
            warn!(?err, "progress reporter task panicked");
        }

        debug!("scan complete, event bus closed");
        Ok(())
    }
}

fn spawn_pool(
    workers: &mut JoinSet<()>,
    protocol: Protocol,
    count: usize,
    retry: Arc<RetryLoop>,
    events: mpsc::Sender<Event>,
    completed: Arc<AtomicU64>,
    cancel: CancellationToken,
) -> mpsc::Sender<crate::feeder::Job> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let queue: SharedJobQueue = Arc::new(AsyncMutex::new(rx));
    for _ in 0..count {
        workers.spawn(worker::run_worker(
            protocol,
            queue.clone(),
            retry.clone(),
            events.clone(),
            completed.clone(),
            cancel.clone(),
        ));
    }
    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use scangate_core::ScanProtocols;
    use std::time::Duration;

    #[tokio::test]
    async fn zero_total_jobs_closes_bus_without_hanging() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let mut rx = engine.events();
        let cancel = CancellationToken::new();

        engine.scan_targets(cancel, vec![]).await.unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn scanning_without_events_call_is_an_error() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        let target = ScanTarget::new("127.0.0.1", vec![80]);
        let result = engine.scan_targets(cancel, vec![target]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn scan_closed_local_port_reports_closed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = listener.local_addr().unwrap().port();
        drop(listener); // frees the port, nothing listens there now

        let config = EngineConfig {
            workers: 4,
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let engine = Engine::new(config).unwrap();
        let mut rx = engine.events();
        let cancel = CancellationToken::new();

        engine
            .scan_range(cancel, "127.0.0.1", vec![closed_port])
            .await
            .unwrap();

        let mut saw_result = false;
        while let Some(event) = rx.recv().await {
            if let Event::Result(result) = event {
                assert_eq!(result.state, scangate_core::ScanState::Closed);
                saw_result = true;
            }
        }
        assert!(saw_result);
    }

    #[tokio::test]
    async fn cancellation_before_scan_starts_yields_no_results() {
        let config = EngineConfig {
            protocols: ScanProtocols::TcpOnly,
            workers: 2,
            timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let engine = Engine::new(config).unwrap();
        let mut rx = engine.events();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let targets = vec![ScanTarget::new("203.0.113.1", (1..=100).collect())];
        engine.scan_targets(cancel, targets).await.unwrap();

        let mut result_count = 0;
        while let Some(event) = rx.recv().await {
            if matches!(event, Event::Result(_)) {
                result_count += 1;
            }
        }
        assert_eq!(result_count, 0);
    }
}
