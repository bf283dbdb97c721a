use crate::core::error::CodecError;
use crate::models::peer::Peer;

/// Packed peer lists plus the seeder/leecher split of the packed set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompactPeers {
    /// 6 bytes per peer: 4 for the address, 2 for the port
    pub ipv4: Vec<u8>,
    /// 18 bytes per peer: 16 for the address, 2 for the port
    pub ipv6: Vec<u8>,
    pub seeders: u32,
    pub leechers: u32,
}

/// Pack peers into compact form, splitting by address family.
///
/// The family is taken from the decoded address length. Any stored address
/// that is not 4 or 16 bytes aborts the whole encoding.
pub fn encode_compact(peers: &[Peer]) -> Result<CompactPeers, CodecError> {
    let mut compact = CompactPeers {
        ipv4: Vec::with_capacity(peers.len() * 6),
        ..Default::default()
    };

    for peer in peers {
        let address =
            hex::decode(&peer.ip).map_err(|_| CodecError::InvalidHex(peer.ip.clone()))?;

        let blob = match address.len() {
            4 => &mut compact.ipv4,
            16 => &mut compact.ipv6,
            len => return Err(CodecError::InvalidAddressLength(len)),
        };

        blob.extend_from_slice(&address);
        blob.extend_from_slice(&peer.port.to_be_bytes());

        if peer.complete {
            compact.seeders += 1;
        } else {
            compact.leechers += 1;
        }
    }

    Ok(compact)
}
