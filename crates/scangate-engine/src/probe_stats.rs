//! Per-port probe statistics, exposed via `Engine::probe_stats`.
//!
//! Grounded on the teacher's pattern of a `parking_lot::Mutex`-guarded
//! table for coarse, infrequently-contended counters (e.g.
//! `prtip-scanner::scheduler`'s stats map) — attempts happen far less
//! often than events flow through the bus, so a plain mutex beats reaching
//! for per-port atomics or a lock-free map.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Counters for every attempt made against one port, across all hosts and
/// retries in a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeStats {
    pub sent: u64,
    pub responses: u64,
    pub successes: u64,
}

#[derive(Default)]
pub struct ProbeStatsTable {
    inner: Mutex<HashMap<u16, ProbeStats>>,
}

impl ProbeStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&self, port: u16) {
        self.inner.lock().entry(port).or_default().sent += 1;
    }

    pub fn record_response(&self, port: u16) {
        self.inner.lock().entry(port).or_default().responses += 1;
    }

    pub fn record_success(&self, port: u16) {
        self.inner.lock().entry(port).or_default().successes += 1;
    }

    pub fn snapshot(&self) -> HashMap<u16, ProbeStats> {
        self.inner.lock().clone()
    }
}
