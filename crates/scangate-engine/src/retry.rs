//! Retry Loop: wraps the executor with the rate gate and backoff.
//!
//! Grounded on the teacher's `prtip-core::retry::retry_with_backoff`
//! (generic backoff loop with jitter) and `concurrent_scanner::scan_socket_tcp`
//! (retry only on a recoverable-looking outcome, not on every failure) —
//! the backoff formula and jitter bounds here are this engine's own,
//! deliberately simpler than the teacher's Nmap-timing-template approach.

use crate::executor::{Executor, ProbeOutcome};
use crate::rate_gate::RateGate;
use rand::Rng;
use scangate_core::{EngineConfig, Protocol};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// UDP per-attempt jitter lower bound, de-correlating probe send times.
const UDP_JITTER_MIN_MS: u64 = 0;
/// Backoff jitter range added on top of the deterministic component.
const BACKOFF_JITTER_MIN_MS: u64 = 10;
const BACKOFF_JITTER_MAX_MS: u64 = 50;

pub struct RetryLoop {
    executor: Arc<Executor>,
    rate_gate: Arc<RateGate>,
    config: Arc<EngineConfig>,
}

impl RetryLoop {
    pub fn new(executor: Arc<Executor>, rate_gate: Arc<RateGate>, config: Arc<EngineConfig>) -> Self {
        Self {
            executor,
            rate_gate,
            config,
        }
    }

    /// Run the probe, retrying on `Filtered` outcomes, until it stops being
    /// `Filtered` or attempts are exhausted. Returns `None` if cancellation
    /// interrupted a suspension point — the job is then abandoned silently,
    /// with no event published.
    pub async fn run(
        &self,
        host: &str,
        port: u16,
        protocol: Protocol,
        cancel: &CancellationToken,
    ) -> Option<ProbeOutcome> {
        let attempts = self.config.total_attempts();
        let mut last_outcome = None;

        for attempt in 0..attempts {
            self.rate_gate.acquire(cancel).await.ok()?;

            if protocol == Protocol::Udp && self.config.udp_jitter_max_ms > UDP_JITTER_MIN_MS {
                let jitter_ms = rand::thread_rng().gen_range(UDP_JITTER_MIN_MS..=self.config.udp_jitter_max_ms);
                sleep_cancellable(Duration::from_millis(jitter_ms), cancel).await?;
            }

            let outcome = self.executor.probe(host, port, protocol).await;
            trace!(%protocol, host, port, attempt, state = ?outcome.state, "probe attempt complete");
            if outcome.state != scangate_core::ScanState::Filtered {
                return Some(outcome);
            }

            let is_last_attempt = attempt + 1 == attempts;
            last_outcome = Some(outcome);
            if !is_last_attempt {
                let backoff = compute_backoff(attempt, self.config.timeout);
                debug!(%protocol, host, port, attempt, ?backoff, "filtered outcome, backing off before retry");
                sleep_cancellable(backoff, cancel).await?;
            }
        }

        last_outcome
    }
}

/// `min(timeout, (attempt + 1) * 50ms) + uniform[10ms, 50ms]`.
fn compute_backoff(attempt: u32, timeout: Duration) -> Duration {
    let deterministic = Duration::from_millis((attempt as u64 + 1) * 50).min(timeout);
    let jitter_ms = rand::thread_rng().gen_range(BACKOFF_JITTER_MIN_MS..=BACKOFF_JITTER_MAX_MS);
    deterministic + Duration::from_millis(jitter_ms)
}

async fn sleep_cancellable(duration: Duration, cancel: &CancellationToken) -> Option<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        _ = sleep(duration) => Some(()),
    }
}
