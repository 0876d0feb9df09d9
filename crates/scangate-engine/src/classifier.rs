//! Classifier: OS-error → `ScanState`, and UDP response → service label
//!
//! The OS-error side is grounded on the teacher's
//! `prtip-core::errors::categorize_io_error`, which maps `io::ErrorKind`/raw
//! OS error numbers to a scan verdict; the raw-code table below
//! (ENETUNREACH, EHOSTUNREACH) is lifted from the same source. The UDP
//! response side has no direct teacher counterpart (the teacher's UDP path
//! classifies ICMP replies from raw packet captures, out of scope here) —
//! its per-protocol parsers are new, informed by the payload shapes in
//! `probe_catalog`.

use scangate_core::{Protocol, ScanState};
use std::error::Error as StdError;
use std::io;
use tracing::trace;

/// Walk an error's `source()` chain looking for the underlying `io::Error`,
/// so callers that wrap a connect/send/recv failure still classify
/// correctly.
fn find_io_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut current: Option<&'a (dyn StdError + 'static)> = Some(err);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        current = err.source();
    }
    None
}

/// Classify a connect/send/recv failure into a `ScanState`.
///
/// Timeouts are handled by the caller (a `tokio::time::timeout` elapsing
/// never produces an `io::Error` at all) — this only covers errors the OS
/// socket layer actually returned.
pub fn classify_error(err: &(dyn StdError + 'static), protocol: Protocol) -> ScanState {
    let Some(io_err) = find_io_error(err) else {
        return default_for(protocol);
    };
    classify_io_error(io_err, protocol)
}

/// Classify a bare `io::Error` (the common case: no wrapping involved).
pub fn classify_io_error(err: &io::Error, protocol: Protocol) -> ScanState {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => {
            trace!(%protocol, kind = "connection_refused", "classified closed");
            return ScanState::Closed;
        }
        io::ErrorKind::TimedOut => {
            trace!(%protocol, kind = "timed_out", "classified filtered");
            return ScanState::Filtered;
        }
        _ => {}
    }
    if let Some(code) = err.raw_os_error() {
        match code {
            // ENETUNREACH, EHOSTUNREACH on Linux — both mean "something on
            // the path dropped it," not "nobody's listening."
            101 | 113 => {
                trace!(%protocol, os_error = code, "classified filtered");
                return ScanState::Filtered;
            }
            _ => {}
        }
    }
    let state = default_for(protocol);
    trace!(%protocol, ?state, kind = ?err.kind(), "classified by protocol default");
    state
}

fn default_for(protocol: Protocol) -> ScanState {
    match protocol {
        Protocol::Tcp => ScanState::Closed,
        Protocol::Udp => ScanState::Filtered,
    }
}

/// Service label and confidence (0.0–1.0) inferred from a UDP response.
pub fn classify_udp_response(payload: &[u8], port: u16) -> (String, f64) {
    let (label, confidence) = match port {
        53 => classify_dns(payload),
        123 => classify_ntp(payload),
        161 => classify_snmp(payload),
        137 => classify_netbios(payload),
        67 | 68 => ("DHCP".to_string(), 0.8),
        500 | 4500 => ("IKE/IPSec".to_string(), 0.8),
        1194 => ("OpenVPN".to_string(), 0.7),
        51820 => ("WireGuard".to_string(), 0.7),
        5353 => ("mDNS/Bonjour".to_string(), 0.8),
        _ => classify_unknown(payload, port),
    };
    trace!(port, %label, confidence, "udp response classified");
    (label, confidence)
}

fn classify_dns(payload: &[u8]) -> (String, f64) {
    let qr_bit_set = payload.len() > 2 && payload[2] & 0x80 != 0;
    if payload.len() > 12 && qr_bit_set {
        ("DNS".to_string(), 0.95)
    } else {
        ("DNS".to_string(), 0.8)
    }
}

fn classify_ntp(payload: &[u8]) -> (String, f64) {
    if payload.len() >= 48 {
        let version = (payload[0] >> 3) & 0x07;
        let mode = payload[0] & 0x07;
        if (2..=4).contains(&version) && mode == 4 {
            return ("NTP".to_string(), 0.95);
        }
    }
    ("NTP".to_string(), 0.8)
}

fn classify_snmp(payload: &[u8]) -> (String, f64) {
    if let Some(&first) = payload.first() {
        if matches!(first, 0xa0..=0xa2) {
            return ("SNMP".to_string(), 0.8);
        }
        if first == 0x30 && has_sensible_asn1_length(payload) {
            return ("SNMP".to_string(), 0.9);
        }
    }
    ("SNMP".to_string(), 0.7)
}

fn has_sensible_asn1_length(payload: &[u8]) -> bool {
    let Some(&len_byte) = payload.get(1) else {
        return false;
    };
    if len_byte & 0x80 == 0 {
        (len_byte as usize) <= payload.len().saturating_sub(2)
    } else {
        // Multi-byte length form: trust it rather than parsing further.
        true
    }
}

fn classify_netbios(payload: &[u8]) -> (String, f64) {
    let is_response = payload.len() > 2 && payload[2] & 0x80 != 0;
    ("NetBIOS".to_string(), if is_response { 0.9 } else { 0.7 })
}

fn classify_unknown(payload: &[u8], port: u16) -> (String, f64) {
    if payload.is_empty() {
        return (format!("?{port}"), 0.3);
    }
    let sanitized = sanitize_and_truncate(payload);
    let confidence = (0.5 + sanitized.len() as f64 / 100.0).min(0.9);
    (sanitized, confidence)
}

fn sanitize_and_truncate(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    let filtered: String = text
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') || (!c.is_ascii() && !c.is_control()))
        .collect();
    if filtered.chars().count() > 64 {
        let mut truncated: String = filtered.chars().take(64).collect();
        truncated.push('…');
        truncated
    } else {
        filtered
    }
}

/// Render a `(label, confidence)` pair into the banner string format:
/// `"<label> (<confidence%>%)"`.
pub fn banner_string(label: &str, confidence: f64) -> String {
    format!("{label} ({}%)", (confidence * 100.0).round() as u32)
}
