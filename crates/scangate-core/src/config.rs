//! Engine configuration
//!
//! `EngineConfig` is cloned and frozen at engine construction; no runtime
//! mutation is supported once a scan starts. It carries no file/TOML
//! loading — that belongs to an external CLI/config-file loader this crate
//! does not implement; `EngineConfig` only defines and validates the
//! recognized options.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Which protocol pool(s) a scan runs.
///
/// TCP and UDP worker pools sit side by side, but a single `scan_targets`
/// call needs to pick between them. Resolved here (see DESIGN.md) as an
/// explicit selector defaulting to TCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanProtocols {
    TcpOnly,
    UdpOnly,
    Both,
}

impl ScanProtocols {
    pub fn wants_tcp(self) -> bool {
        matches!(self, ScanProtocols::TcpOnly | ScanProtocols::Both)
    }

    pub fn wants_udp(self) -> bool {
        matches!(self, ScanProtocols::UdpOnly | ScanProtocols::Both)
    }
}

impl Default for ScanProtocols {
    fn default() -> Self {
        ScanProtocols::TcpOnly
    }
}

/// Tunable parameters for one engine scan.
///
/// All fields have defaults; values here are the options the engine
/// recognizes, not a configuration-language surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which protocol pool(s) this scan runs.
    pub protocols: ScanProtocols,

    /// Desired TCP worker concurrency. 0 lets the engine derive a count
    /// from the CPU count (see `scangate_engine::worker::tcp_worker_count`).
    pub workers: usize,

    /// Fraction of `workers` devoted to UDP scanning. A ratio of 0 still
    /// runs exactly one UDP worker rather than disabling UDP outright.
    pub udp_worker_ratio: f64,

    /// Per-attempt TCP connect deadline, and the default UDP read deadline.
    pub timeout: Duration,

    /// Overrides `timeout` for UDP response reads; `None` means "use
    /// `timeout`".
    pub udp_read_timeout: Option<Duration>,

    /// Maximum bytes read per UDP response.
    pub udp_buffer_size: usize,

    /// Maximum probes initiated per second across all workers. 0 disables
    /// the rate gate.
    pub rate_limit: u32,

    /// If true and a TCP port is open, read up to 512 bytes as a banner.
    pub banner_grab: bool,

    /// Additional attempts on timeout/filtered outcomes. Negative values
    /// are treated as 0.
    pub max_retries: i32,

    /// Upper bound (inclusive) on the random per-probe sleep UDP workers
    /// take after acquiring a rate-gate token, to de-correlate probes.
    pub udp_jitter_max_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            protocols: ScanProtocols::TcpOnly,
            workers: 100,
            udp_worker_ratio: 0.5,
            timeout: Duration::from_secs(3),
            udp_read_timeout: None,
            udp_buffer_size: 1024,
            rate_limit: 0,
            banner_grab: false,
            max_retries: 2,
            udp_jitter_max_ms: 0,
        }
    }
}

impl EngineConfig {
    /// Effective number of additional attempts after the first. Negative
    /// configured values are treated as 0.
    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.max(0) as u32
    }

    /// Total attempts (first try + retries), always at least 1.
    pub fn total_attempts(&self) -> u32 {
        self.effective_max_retries() + 1
    }

    /// Deadline applied to a UDP response read.
    pub fn udp_read_deadline(&self) -> Duration {
        self.udp_read_timeout.unwrap_or(self.timeout)
    }

    /// Validate option combinations the engine cannot make sense of.
    ///
    /// This does not reject every questionable value (e.g. `workers: 0`
    /// and `udp_worker_ratio: 0.0` are both valid edge cases) — only
    /// combinations that would make the engine unable to start at all.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            warn!("rejecting config: timeout must be greater than zero");
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        if self.udp_buffer_size == 0 {
            warn!("rejecting config: udp_buffer_size must be greater than zero");
            return Err(Error::Config(
                "udp_buffer_size must be greater than zero".into(),
            ));
        }
        if !self.udp_worker_ratio.is_finite() || self.udp_worker_ratio < 0.0 {
            warn!(
                ratio = self.udp_worker_ratio,
                "rejecting config: udp_worker_ratio must be a non-negative finite number"
            );
            return Err(Error::Config(
                "udp_worker_ratio must be a non-negative finite number".into(),
            ));
        }
        Ok(())
    }
}
