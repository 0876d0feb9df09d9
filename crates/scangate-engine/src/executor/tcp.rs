//! TCP probe attempt: connect, optionally read a banner, always close.
//!
//! Mirrors the shape of the teacher's `scan_socket_tcp` (connect under a
//! deadline, classify the connect error, shut the stream down on every
//! exit path) without its retry loop — retries live one layer up, in
//! `crate::retry`.

use super::ProbeOutcome;
use crate::classifier::classify_io_error;
use scangate_core::{EngineConfig, Protocol, ScanState};
use std::net::Ipv6Addr;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

const BANNER_BUF: usize = 512;
const BANNER_DEADLINE: Duration = Duration::from_secs(1);

/// Render `host:port`, bracketing `host` if it's a bare IPv6 literal.
///
/// Hostnames and IPv4 literals pass through unchanged; DNS resolution
/// happens later, inside `tokio::net::{TcpStream, lookup_host}`.
pub(crate) fn resolve_target(host: &str, port: u16) -> String {
    if host.starts_with('[') || host.parse::<Ipv6Addr>().is_err() {
        format!("{host}:{port}")
    } else {
        format!("[{host}]:{port}")
    }
}

pub async fn probe_tcp(host: &str, port: u16, config: &EngineConfig) -> ProbeOutcome {
    let addr = resolve_target(host, port);
    let start = Instant::now();

    let connect = timeout(config.timeout, TcpStream::connect(&addr)).await;
    let mut stream = match connect {
        Ok(Ok(stream)) => {
            trace!(host, port, "tcp connect succeeded");
            stream
        }
        Ok(Err(err)) => {
            let state = classify_io_error(&err, Protocol::Tcp);
            debug!(host, port, ?state, %err, "tcp connect failed");
            return ProbeOutcome {
                state,
                banner: String::new(),
                duration: start.elapsed(),
            };
        }
        Err(_) => {
            debug!(host, port, "tcp connect timed out, classified filtered");
            return ProbeOutcome {
                state: ScanState::Filtered,
                banner: String::new(),
                duration: start.elapsed(),
            };
        }
    };

    let mut banner = String::new();
    if config.banner_grab {
        let mut buf = [0u8; BANNER_BUF];
        match timeout(BANNER_DEADLINE, stream.read(&mut buf)).await {
            Ok(Ok(n)) => {
                banner = String::from_utf8_lossy(&buf[..n]).into_owned();
                trace!(host, port, banner_len = n, "banner read");
            }
            Ok(Err(err)) => trace!(host, port, %err, "banner read failed"),
            Err(_) => trace!(host, port, "banner read timed out"),
        }
    }
    let _ = tokio::io::AsyncWriteExt::shutdown(&mut stream).await;

    ProbeOutcome {
        state: ScanState::Open,
        banner,
        duration: start.elapsed(),
    }
}
