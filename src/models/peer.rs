use std::net::IpAddr;

/// Hex length of a stored IPv4 address (4 raw bytes).
pub const IPV4_HEX_LEN: usize = 8;
/// Hex length of a stored IPv6 address (16 raw bytes).
pub const IPV6_HEX_LEN: usize = 32;

/// Observed state of a swarm participant.
///
/// Built fresh for every announce and never mutated afterwards; storage owns
/// merging and expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peer {
    /// Lowercase hex of the 20-byte info hash
    pub info_hash: String,
    /// Lowercase hex of the raw address bytes (8 chars IPv4, 32 chars IPv6)
    pub ip: String,
    /// Listening port
    pub port: u16,
    /// Whether the peer reported having the full content
    pub complete: bool,
    /// Unix timestamp in milliseconds after which the record is stale
    pub expires: i64,
}

impl Peer {
    pub fn new(info_hash: String, ip: IpAddr, port: u16, complete: bool, expires: i64) -> Self {
        Self {
            info_hash,
            ip: encode_ip(ip),
            port,
            complete,
            expires,
        }
    }

    /// Identity used for upserts.
    pub fn key(&self) -> (String, u16) {
        (self.ip.clone(), self.port)
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires <= now_millis
    }

    pub fn has_valid_ip(&self) -> bool {
        matches!(self.ip.len(), IPV4_HEX_LEN | IPV6_HEX_LEN)
            && self.ip.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

/// Hex-encode the raw octets of an address.
pub fn encode_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => hex::encode(v4.octets()),
        IpAddr::V6(v6) => hex::encode(v6.octets()),
    }
}
