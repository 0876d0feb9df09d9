//! Probe Catalog: byte-exact UDP payloads per well-known port
//!
//! Grounded on the teacher's `prtip-network::protocol_payloads` table, which
//! builds the same idea (`get_udp_payload(port) -> Vec<u8>` plus unit tests
//! asserting exact byte layouts) for a larger port set. This catalog is
//! trimmed to ten well-known ports, and callers may register overrides
//! before a scan starts via `ProbeCatalog::register`.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Port → UDP probe payload, with caller-supplied overrides.
///
/// Overrides must be registered before the catalog is handed to workers —
/// `add_custom_udp_probe` is only meant to be called prior to `scan_*`, so
/// the lock here exists for interior mutability during setup, not for
/// concurrent mutation while a scan runs.
#[derive(Default)]
pub struct ProbeCatalog {
    overrides: RwLock<HashMap<u16, Vec<u8>>>,
}

impl ProbeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, port: u16, payload: Vec<u8>) {
        self.overrides.write().insert(port, payload);
    }

    /// Payload to send for `port`. Falls back to an empty probe when the
    /// port has neither an override nor a built-in entry.
    pub fn probe_for(&self, port: u16) -> Vec<u8> {
        if let Some(custom) = self.overrides.read().get(&port) {
            return custom.clone();
        }
        builtin_probe(port).unwrap_or_default()
    }
}

/// Static port → payload table. Exposed standalone so the classifier and
/// tests can reason about it without constructing a full catalog.
pub fn builtin_probe(port: u16) -> Option<Vec<u8>> {
    match port {
        53 => Some(dns_version_bind_query()),
        67 => Some(dhcp_discover()),
        69 => Some(tftp_read_request()),
        123 => Some(ntp_client_request()),
        137 => Some(netbios_name_query()),
        161 => Some(snmp_get_sys_descr()),
        500 => Some(ike_main_mode_header()),
        1194 => Some(openvpn_reset()),
        5353 => Some(mdns_service_query()),
        51820 => Some(wireguard_handshake_opener()),
        _ => None,
    }
}

/// DNS query for `version.bind` TXT/CHAOS, the conventional "what server is
/// this" probe (used by `dig @host version.bind txt chaos`).
fn dns_version_bind_query() -> Vec<u8> {
    let mut buf = Vec::with_capacity(32);
    buf.extend_from_slice(&[0x13, 0x37]); // transaction id
    buf.extend_from_slice(&[0x01, 0x00]); // flags: standard query, recursion desired
    buf.extend_from_slice(&[0x00, 0x01]); // qdcount = 1
    buf.extend_from_slice(&[0x00, 0x00]); // ancount
    buf.extend_from_slice(&[0x00, 0x00]); // nscount
    buf.extend_from_slice(&[0x00, 0x00]); // arcount
    buf.push(7);
    buf.extend_from_slice(b"version");
    buf.push(4);
    buf.extend_from_slice(b"bind");
    buf.push(0); // end of name
    buf.extend_from_slice(&[0x00, 0x10]); // qtype = TXT
    buf.extend_from_slice(&[0x00, 0x03]); // qclass = CHAOS
    buf
}

/// Minimal 240-byte BOOTREQUEST: fixed header fields zeroed except
/// `op`/`htype`/`hlen`, followed by the DHCP magic cookie and no options.
fn dhcp_discover() -> Vec<u8> {
    let mut buf = vec![0u8; 240];
    buf[0] = 1; // op: BOOTREQUEST
    buf[1] = 1; // htype: Ethernet
    buf[2] = 6; // hlen
    buf[236..240].copy_from_slice(&[99, 130, 83, 99]); // magic cookie
    buf
}

/// TFTP RRQ for a nonexistent filename in octet mode.
fn tftp_read_request() -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    buf.extend_from_slice(&[0x00, 0x01]); // opcode: RRQ
    buf.extend_from_slice(b"probe");
    buf.push(0);
    buf.extend_from_slice(b"octet");
    buf.push(0);
    buf
}

/// NTP client request: LI=0, VN=3, Mode=3 (client), rest zeroed.
fn ntp_client_request() -> Vec<u8> {
    let mut buf = vec![0u8; 48];
    buf[0] = 0x1b;
    buf
}

/// NBNS wildcard (`*`) name query, encoded first-level per RFC 1002 §4.1.
fn netbios_name_query() -> Vec<u8> {
    let mut buf = Vec::with_capacity(50);
    buf.extend_from_slice(&[0x29, 0x11]); // transaction id
    buf.extend_from_slice(&[0x00, 0x10]); // flags: standard query, broadcast
    buf.extend_from_slice(&[0x00, 0x01]); // qdcount
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.push(0x20); // encoded name length
    // "*" padded to 16 bytes with NUL, each byte split into two nibbles
    // and offset by 'A' (the standard NetBIOS first-level encoding).
    let mut name = [0u8; 16];
    name[0] = b'*';
    for byte in name {
        buf.push((byte >> 4) + b'A');
        buf.push((byte & 0x0f) + b'A');
    }
    buf.push(0); // end of name
    buf.extend_from_slice(&[0x00, 0x21]); // qtype = NB
    buf.extend_from_slice(&[0x00, 0x01]); // qclass = IN
    buf
}

/// SNMPv1 GetRequest for `sysDescr.0` with the `public` community.
fn snmp_get_sys_descr() -> Vec<u8> {
    vec![
        0x30, 0x26, // SEQUENCE, len 38
        0x02, 0x01, 0x00, // version 1 (SNMPv1 == 0)
        0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', // community
        0xa0, 0x19, // GetRequest PDU, len 25
        0x02, 0x01, 0x01, // request id
        0x02, 0x01, 0x00, // error-status
        0x02, 0x01, 0x00, // error-index
        0x30, 0x0e, // varbind list, len 14
        0x30, 0x0c, // varbind, len 12
        0x06, 0x08, 0x2b, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00, // OID 1.3.6.1.2.1.1.1.0
        0x05, 0x00, // value: NULL
    ]
}

/// ISAKMP header only (28 bytes = 0x1c), zeroed cookies, Main Mode.
fn ike_main_mode_header() -> Vec<u8> {
    let mut buf = vec![0u8; 28];
    buf[16] = 0x00; // next payload: none
    buf[17] = 0x10; // version 1.0
    buf[18] = 0x02; // exchange type: Main Mode
    buf[19] = 0x00; // flags
    buf[20..24].copy_from_slice(&0u32.to_be_bytes()); // message id
    buf[24..28].copy_from_slice(&28u32.to_be_bytes()); // length
    buf
}

/// 5-byte OpenVPN `P_CONTROL_HARD_RESET_CLIENT_V2` opener (opcode 7, key id
/// 0, packed as `(7 << 3) | 0`), followed by a zeroed partial session id.
fn openvpn_reset() -> Vec<u8> {
    vec![(7 << 3) | 0, 0x00, 0x00, 0x00, 0x00]
}

/// mDNS PTR query for `_services._dns-sd._udp.local`.
fn mdns_service_query() -> Vec<u8> {
    let mut buf = Vec::with_capacity(48);
    buf.extend_from_slice(&[0x00, 0x00]); // transaction id (0 for mDNS)
    buf.extend_from_slice(&[0x00, 0x00]); // flags
    buf.extend_from_slice(&[0x00, 0x01]); // qdcount
    buf.extend_from_slice(&[0u8; 6]); // ancount, nscount, arcount
    for label in ["_services", "_dns-sd", "_udp", "local"] {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
    buf.extend_from_slice(&[0x00, 0x0c]); // qtype = PTR
    buf.extend_from_slice(&[0x00, 0x01]); // qclass = IN
    buf
}

/// 4-byte WireGuard handshake-initiation opener: message type 1, LE u32.
fn wireguard_handshake_opener() -> Vec<u8> {
    vec![0x01, 0x00, 0x00, 0x00]
}
