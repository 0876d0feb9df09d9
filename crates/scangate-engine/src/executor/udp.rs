//! UDP probe attempt over a connected socket.
//!
//! Grounded on `examples/other_examples/88e83185_deepskilling-RUSTSCAN`'s
//! `udp_scan.rs`: bind an ephemeral socket, `connect` it to the target so
//! ICMP port-unreachable surfaces as a normal `recv` error instead of
//! requiring a raw socket, send the catalog payload, then read with a
//! deadline. The teacher's own UDP scanner instead sniffs ICMP off a packet
//! capture, which spec's Non-goals exclude.

use super::tcp::resolve_target;
use super::ProbeOutcome;
use crate::classifier::{banner_string, classify_io_error, classify_udp_response};
use scangate_core::{EngineConfig, Protocol, ScanState};
use std::time::Instant;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, trace};

pub async fn probe_udp(host: &str, port: u16, payload: &[u8], config: &EngineConfig) -> ProbeOutcome {
    let start = Instant::now();
    let addr = resolve_target(host, port);

    let target = match lookup_host(&addr).await {
        Ok(mut addrs) => addrs.next(),
        Err(_) => None,
    };
    let Some(target) = target else {
        debug!(host, port, "udp lookup failed, classified filtered");
        return filtered(start);
    };

    let bind_addr = if target.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
    let socket = match UdpSocket::bind(bind_addr).await {
        Ok(socket) => socket,
        Err(err) => {
            debug!(host, port, %err, "udp bind failed, classified filtered");
            return filtered(start);
        }
    };

    if let Err(err) = socket.connect(target).await {
        let state = classify_io_error(&err, Protocol::Udp);
        debug!(host, port, ?state, %err, "udp connect failed");
        return ProbeOutcome {
            state,
            banner: String::new(),
            duration: start.elapsed(),
        };
    }

    if let Err(err) = socket.send(payload).await {
        let state = classify_io_error(&err, Protocol::Udp);
        debug!(host, port, ?state, %err, "udp send failed");
        return ProbeOutcome {
            state,
            banner: String::new(),
            duration: start.elapsed(),
        };
    }
    trace!(host, port, payload_len = payload.len(), "udp probe sent");

    let mut buf = vec![0u8; config.udp_buffer_size];
    match timeout(config.udp_read_deadline(), socket.recv(&mut buf)).await {
        Ok(Ok(n)) => {
            trace!(host, port, response_len = n, "udp response received");
            let banner = if config.banner_grab {
                let (label, confidence) = classify_udp_response(&buf[..n], port);
                banner_string(&label, confidence)
            } else {
                String::new()
            };
            ProbeOutcome {
                state: ScanState::Open,
                banner,
                duration: start.elapsed(),
            }
        }
        Ok(Err(err)) => {
            let state = classify_io_error(&err, Protocol::Udp);
            debug!(host, port, ?state, %err, "udp recv failed");
            ProbeOutcome {
                state,
                banner: String::new(),
                duration: start.elapsed(),
            }
        }
        Err(_) => {
            debug!(host, port, "udp recv timed out, classified filtered");
            filtered(start)
        }
    }
}

fn filtered(start: Instant) -> ProbeOutcome {
    ProbeOutcome {
        state: ScanState::Filtered,
        banner: String::new(),
        duration: start.elapsed(),
    }
}
