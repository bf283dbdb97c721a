use crate::core::error::StoreError;
use crate::models::peer::Peer;
use crate::utils::time::current_timestamp_millis;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::seq::SliceRandom;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub peers: usize,
    pub torrents: usize,
}

/// Durable home of peer records.
///
/// Implementations must make `upsert` atomic per `(info_hash, ip, port)` and
/// must tolerate concurrent calls for the same torrent.
#[async_trait]
pub trait PeerStorage: Send + Sync {
    /// Up to `limit` unexpired peers sharing `requesting`'s torrent, never
    /// including `requesting` itself.
    async fn get_peers(&self, requesting: &Peer, limit: usize) -> Result<Vec<Peer>, StoreError>;

    /// Insert or replace the record with the same identity.
    ///
    /// Returns whether the stored record is complete once merged, which may
    /// differ from `peer.complete`.
    async fn upsert(&self, peer: Peer) -> Result<bool, StoreError>;

    /// Delete every record whose expiry has passed; returns how many went.
    async fn purge_expired(&self, now_millis: i64) -> Result<usize, StoreError>;

    async fn stats(&self) -> StoreStats;
}

type PeerKey = (String, u16);

/// In-memory peer store
pub struct MemoryPeerStore {
    swarms: DashMap<String, DashMap<PeerKey, Peer>>,
}

impl MemoryPeerStore {
    pub fn new() -> Self {
        Self {
            swarms: DashMap::new(),
        }
    }

    fn remove_peer(&self, info_hash: &str, key: &PeerKey) {
        if let Some(swarm) = self.swarms.get(info_hash) {
            swarm.remove(key);
        }
        self.swarms.remove_if(info_hash, |_, swarm| swarm.is_empty());
    }
}

impl Default for MemoryPeerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerStorage for MemoryPeerStore {
    async fn get_peers(&self, requesting: &Peer, limit: usize) -> Result<Vec<Peer>, StoreError> {
        let swarm = match self.swarms.get(&requesting.info_hash) {
            Some(swarm) => swarm,
            None => return Ok(Vec::new()),
        };

        let now = current_timestamp_millis();
        let exclude = requesting.key();

        let mut peers: Vec<Peer> = swarm
            .iter()
            .filter(|entry| *entry.key() != exclude && !entry.value().is_expired(now))
            .map(|entry| entry.value().clone())
            .collect();

        drop(swarm);

        peers.shuffle(&mut rand::rng());
        peers.truncate(limit);

        Ok(peers)
    }

    /// A seeder that re-announces without `event=completed` stays a seeder.
    /// An already-expired record (a stopped peer) removes the stored one.
    async fn upsert(&self, mut peer: Peer) -> Result<bool, StoreError> {
        if !peer.has_valid_ip() {
            return Err(StoreError::InvalidRecord(format!("invalid ip {:?}", peer.ip)));
        }
        if peer.info_hash.len() != 40 {
            return Err(StoreError::InvalidRecord(format!(
                "invalid info_hash {:?}",
                peer.info_hash
            )));
        }

        let now = current_timestamp_millis();
        let key = peer.key();

        if peer.is_expired(now) {
            self.remove_peer(&peer.info_hash, &key);
            return Ok(peer.complete);
        }

        let swarm = self
            .swarms
            .entry(peer.info_hash.clone())
            .or_insert_with(DashMap::new);

        if let Entry::Occupied(existing) = swarm.entry(key.clone()) {
            peer.complete |= existing.get().complete && !existing.get().is_expired(now);
        }
        let complete = peer.complete;
        swarm.insert(key, peer);

        Ok(complete)
    }

    async fn purge_expired(&self, now_millis: i64) -> Result<usize, StoreError> {
        let mut removed = 0;

        for swarm in self.swarms.iter() {
            let before = swarm.len();
            swarm.retain(|_, peer| !peer.is_expired(now_millis));
            removed += before - swarm.len();
        }

        self.swarms.retain(|_, swarm| !swarm.is_empty());

        Ok(removed)
    }

    async fn stats(&self) -> StoreStats {
        StoreStats {
            peers: self.swarms.iter().map(|swarm| swarm.len()).sum(),
            torrents: self.swarms.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    const HASH: &str = "0101010101010101010101010101010101010101";

    fn create_test_peer(info_hash: &str, last_octet: u8, port: u16, complete: bool, expires: i64) -> Peer {
        Peer::new(
            info_hash.to_string(),
            IpAddr::V4(Ipv4Addr::new(198, 51, 100, last_octet)),
            port,
            complete,
            expires,
        )
    }

    fn live() -> i64 {
        current_timestamp_millis() + 3_600_000
    }

    #[tokio::test]
    async fn test_upsert_and_get_peers_excludes_requester() {
        let store = MemoryPeerStore::new();
        for i in 1..=3 {
            store.upsert(create_test_peer(HASH, i, 6881, false, live())).await.unwrap();
        }

        let requester = create_test_peer(HASH, 1, 6881, false, live());
        let peers = store.get_peers(&requester, 10).await.unwrap();

        assert_eq!(peers.len(), 2);
        assert!(!peers.iter().any(|p| p.key() == requester.key()));
    }

    #[tokio::test]
    async fn test_same_ip_different_port_is_distinct() {
        let store = MemoryPeerStore::new();
        store.upsert(create_test_peer(HASH, 1, 6881, false, live())).await.unwrap();
        store.upsert(create_test_peer(HASH, 1, 6882, false, live())).await.unwrap();

        assert_eq!(store.stats().await.peers, 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_identity() {
        let store = MemoryPeerStore::new();
        store.upsert(create_test_peer(HASH, 1, 6881, false, live())).await.unwrap();
        store.upsert(create_test_peer(HASH, 1, 6881, true, live() + 10)).await.unwrap();

        assert_eq!(store.stats().await, StoreStats { peers: 1, torrents: 1 });

        let requester = create_test_peer(HASH, 9, 1, false, live());
        let peers = store.get_peers(&requester, 10).await.unwrap();
        assert!(peers[0].complete);
    }

    #[tokio::test]
    async fn test_upsert_keeps_completion() {
        let store = MemoryPeerStore::new();
        store.upsert(create_test_peer(HASH, 1, 6881, true, live())).await.unwrap();
        store.upsert(create_test_peer(HASH, 1, 6881, false, live())).await.unwrap();

        let requester = create_test_peer(HASH, 9, 1, false, live());
        let peers = store.get_peers(&requester, 10).await.unwrap();
        assert!(peers[0].complete);
    }

    #[tokio::test]
    async fn test_stopped_peer_is_removed() {
        let store = MemoryPeerStore::new();
        store.upsert(create_test_peer(HASH, 1, 6881, false, live())).await.unwrap();
        store
            .upsert(create_test_peer(HASH, 1, 6881, false, current_timestamp_millis()))
            .await
            .unwrap();

        assert_eq!(store.stats().await, StoreStats::default());
    }

    #[tokio::test]
    async fn test_get_peers_respects_limit_and_torrent() {
        let store = MemoryPeerStore::new();
        let other = "0202020202020202020202020202020202020202";
        for i in 1..=20 {
            store.upsert(create_test_peer(HASH, i, 6881, false, live())).await.unwrap();
        }
        store.upsert(create_test_peer(other, 200, 6881, false, live())).await.unwrap();

        let requester = create_test_peer(HASH, 250, 6881, false, live());
        assert_eq!(store.get_peers(&requester, 5).await.unwrap().len(), 5);
        assert_eq!(store.get_peers(&requester, 100).await.unwrap().len(), 20);

        let requester = create_test_peer(other, 250, 6881, false, live());
        assert_eq!(store.get_peers(&requester, 100).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_peers_unknown_torrent() {
        let store = MemoryPeerStore::new();
        let requester = create_test_peer(HASH, 1, 6881, false, live());
        assert!(store.get_peers(&requester, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryPeerStore::new();
        let now = current_timestamp_millis();

        store.upsert(create_test_peer(HASH, 1, 6881, true, now + 100_000)).await.unwrap();
        store.upsert(create_test_peer(HASH, 2, 6881, false, now + 1_000)).await.unwrap();
        store.upsert(create_test_peer(HASH, 3, 6881, true, now + 2_000)).await.unwrap();

        let removed = store.purge_expired(now + 50_000).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.stats().await, StoreStats { peers: 1, torrents: 1 });

        let removed = store.purge_expired(now + 200_000).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.stats().await, StoreStats::default());
    }

    #[tokio::test]
    async fn test_upsert_rejects_malformed_records() {
        let store = MemoryPeerStore::new();

        let mut peer = create_test_peer(HASH, 1, 6881, false, live());
        peer.ip = "0102".to_string();
        assert!(matches!(store.upsert(peer).await, Err(StoreError::InvalidRecord(_))));

        let peer = create_test_peer("abcd", 1, 6881, false, live());
        assert!(matches!(store.upsert(peer).await, Err(StoreError::InvalidRecord(_))));
    }

    #[tokio::test]
    async fn test_upsert_reports_merged_completion() {
        let store = MemoryPeerStore::new();

        assert!(!store.upsert(create_test_peer(HASH, 1, 6881, false, live())).await.unwrap());
        assert!(store.upsert(create_test_peer(HASH, 1, 6881, true, live())).await.unwrap());
        assert!(store.upsert(create_test_peer(HASH, 1, 6881, false, live())).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_announces_on_one_swarm() {
        let store = Arc::new(MemoryPeerStore::new());
        let mut handles = Vec::new();

        // 32 distinct identities, each announced 4 times from racing tasks
        for round in 0..4u16 {
            for octet in 1..=32u8 {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    let peer = create_test_peer(HASH, octet, 6881, round % 2 == 1, live());
                    store.upsert(peer.clone()).await.unwrap();
                    store.get_peers(&peer, 100).await.unwrap()
                }));
            }
        }

        for handle in handles {
            let peers = handle.await.unwrap();
            let keys: HashSet<_> = peers.iter().map(Peer::key).collect();
            assert_eq!(keys.len(), peers.len());
        }

        assert_eq!(store.stats().await, StoreStats { peers: 32, torrents: 1 });

        let requester = create_test_peer(HASH, 250, 6881, false, live());
        let peers = store.get_peers(&requester, 100).await.unwrap();
        let keys: HashSet<_> = peers.iter().map(Peer::key).collect();
        assert_eq!(peers.len(), 32);
        assert_eq!(keys.len(), 32);
    }
}
