use super::compact::CompactPeers;
use super::encoder::{encode, Value};

/// Successful announce reply, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceResponse {
    pub complete: u32,
    pub incomplete: u32,
    pub interval: u32,
    /// Packed IPv4 peers
    pub peers: Vec<u8>,
    /// Packed IPv6 peers, omitted from the wire when `None`
    pub peers_ipv6: Option<Vec<u8>>,
}

impl AnnounceResponse {
    /// Build a response from packed peers. `peers_ipv6` is only kept when at
    /// least one IPv6 peer was packed.
    pub fn new(compact: CompactPeers, complete: u32, incomplete: u32, interval: u32) -> Self {
        let peers_ipv6 = if compact.ipv6.is_empty() {
            None
        } else {
            Some(compact.ipv6)
        };

        Self {
            complete,
            incomplete,
            interval,
            peers: compact.ipv4,
            peers_ipv6,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut pairs = vec![
            (b"complete".to_vec(), Value::Integer(i64::from(self.complete))),
            (b"incomplete".to_vec(), Value::Integer(i64::from(self.incomplete))),
            (b"interval".to_vec(), Value::Integer(i64::from(self.interval))),
            (b"peers".to_vec(), Value::Bytes(self.peers.clone())),
        ];

        if let Some(ipv6) = &self.peers_ipv6 {
            pairs.push((b"peers_ipv6".to_vec(), Value::Bytes(ipv6.clone())));
        }

        Value::Dict(pairs)
    }

    pub fn to_bencode(&self) -> Vec<u8> {
        encode(&self.to_value())
    }
}
