use crate::announce::interpreter::{interpret, AnnounceRequest};
use crate::bencode::compact::encode_compact;
use crate::bencode::response::AnnounceResponse;
use crate::core::config::{FailureMode, TrackerConfig};
use crate::core::error::AnnounceError;
use crate::metrics::collector::Metrics;
use crate::stores::peer_store::PeerStorage;
use crate::utils::time::current_timestamp_millis;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Serves announces against an injected peer store.
pub struct Announcer {
    storage: Arc<dyn PeerStorage>,
    metrics: Arc<Metrics>,
    interval: u32,
    peer_limit: usize,
    failure_mode: FailureMode,
}

impl Announcer {
    pub fn new(storage: Arc<dyn PeerStorage>, metrics: Arc<Metrics>, config: &TrackerConfig) -> Self {
        Self {
            storage,
            metrics,
            interval: config.interval,
            peer_limit: config.peer_limit,
            failure_mode: config.failure_mode,
        }
    }

    /// Answer an announce. Always yields a body for the client; failures are
    /// logged, counted and rendered as a failure response.
    pub async fn handle(&self, request: &AnnounceRequest) -> Vec<u8> {
        self.metrics.increment_announces();

        match self.try_handle(request, current_timestamp_millis()).await {
            Ok(body) => {
                self.metrics.increment_successful();
                body
            }
            Err(e) => {
                match &e {
                    AnnounceError::Validation(_) => {
                        warn!(remote = %request.remote, error = %e, "Rejected announce")
                    }
                    _ => error!(remote = %request.remote, error = %e, "Announce failed"),
                }
                self.metrics.record_failure(&e);
                e.failure_body(self.failure_mode)
            }
        }
    }

    pub async fn try_handle(
        &self,
        request: &AnnounceRequest,
        now_millis: i64,
    ) -> Result<Vec<u8>, AnnounceError> {
        let peer = interpret(request, self.interval, now_millis).await?;

        debug!(
            info_hash = %peer.info_hash,
            ip = %peer.ip,
            port = peer.port,
            complete = peer.complete,
            "Interpreted announce"
        );

        // The requester is excluded from its own peer list, so the lookup and
        // the upsert do not depend on each other.
        let (peers, upserted) = tokio::join!(
            self.storage.get_peers(&peer, self.peer_limit),
            self.storage.upsert(peer.clone()),
        );
        let stored_complete = upserted?;
        let peers = peers?;

        let compact = encode_compact(&peers)?;

        // The requester counts as the store sees it after the merge
        let (mut complete, mut incomplete) = (compact.seeders, compact.leechers);
        if !peer.is_expired(now_millis) {
            if stored_complete {
                complete += 1;
            } else {
                incomplete += 1;
            }
        }

        debug!(
            info_hash = %peer.info_hash,
            peers_returned = peers.len(),
            complete,
            incomplete,
            "Building announce response"
        );

        let response = AnnounceResponse::new(compact, complete, incomplete, self.interval);
        Ok(response.to_bencode())
    }
}
