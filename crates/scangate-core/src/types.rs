//! Target and protocol types shared by the core and engine crates

use serde::{Deserialize, Serialize};

/// One host and the ports to probe on it.
///
/// Produced by an external target-string parser (CIDR/range syntax is out
/// of scope for the engine) and handed to the engine immutably. `host` may
/// be an IPv4/IPv6 literal or a hostname — resolution happens lazily at
/// dial time via the OS resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    pub host: String,
    pub ports: Vec<u16>,
}

impl ScanTarget {
    /// Convenience constructor for a single host with an explicit port list
    pub fn new(host: impl Into<String>, ports: Vec<u16>) -> Self {
        Self {
            host: host.into(),
            ports,
        }
    }

    /// Number of (host, port) jobs this target expands into
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

/// Transport protocol a probe was issued over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single probed port.
///
/// The classifier derives this from a socket error or a received payload;
/// see `scangate_engine::classifier` for the decision rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    Open,
    Closed,
    Filtered,
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanState::Open => f.write_str("open"),
            ScanState::Closed => f.write_str("closed"),
            ScanState::Filtered => f.write_str("filtered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_target_port_count() {
        let target = ScanTarget::new("127.0.0.1", vec![22, 80, 443]);
        assert_eq!(target.port_count(), 3);
    }

    #[test]
    fn protocol_display_matches_result_event_contract() {
        assert_eq!(Protocol::Tcp.as_str(), "tcp");
        assert_eq!(Protocol::Udp.as_str(), "udp");
    }

    #[test]
    fn scan_state_display() {
        assert_eq!(ScanState::Open.to_string(), "open");
        assert_eq!(ScanState::Closed.to_string(), "closed");
        assert_eq!(ScanState::Filtered.to_string(), "filtered");
    }
}
