//! Probe Executor: one TCP connect or one UDP send/recv attempt
//!
//! Grounded on the teacher's `prtip-scanner::concurrent_scanner::scan_socket_tcp`
//! for the TCP side (connect-with-deadline, optional banner read, always
//! close) and on `examples/other_examples/88e83185_deepskilling-RUSTSCAN`'s
//! `udp_scan.rs` for the UDP side (a connected `UdpSocket`, send the probe,
//! read with a deadline) rather than the teacher's own raw-packet UDP path,
//! which requires a packet capture this engine doesn't implement.

pub(crate) mod tcp;
mod udp;

use crate::probe_catalog::ProbeCatalog;
use crate::probe_stats::ProbeStatsTable;
use scangate_core::{EngineConfig, Protocol, ScanState};
use std::sync::Arc;
use std::time::Duration;

/// Result of a single probe attempt, before retry or classification-into-event.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub state: ScanState,
    pub banner: String,
    pub duration: Duration,
}

/// Runs individual probe attempts and records per-port statistics.
///
/// One `Executor` is shared by every worker in a pool (TCP or UDP); it
/// holds no per-attempt state itself; `ProbeStatsTable` is the only mutable
/// shared state and is synchronized internally.
pub struct Executor {
    config: Arc<EngineConfig>,
    catalog: Arc<ProbeCatalog>,
    stats: Arc<ProbeStatsTable>,
}

impl Executor {
    pub fn new(config: Arc<EngineConfig>, catalog: Arc<ProbeCatalog>, stats: Arc<ProbeStatsTable>) -> Self {
        Self { config, catalog, stats }
    }

    pub async fn probe(&self, host: &str, port: u16, protocol: Protocol) -> ProbeOutcome {
        self.stats.record_sent(port);
        let outcome = match protocol {
            Protocol::Tcp => tcp::probe_tcp(host, port, &self.config).await,
            Protocol::Udp => {
                let payload = self.catalog.probe_for(port);
                udp::probe_udp(host, port, &payload, &self.config).await
            }
        };
        match outcome.state {
            ScanState::Open => {
                self.stats.record_response(port);
                self.stats.record_success(port);
            }
            ScanState::Closed => self.stats.record_response(port),
            ScanState::Filtered => {}
        }
        outcome
    }
}
