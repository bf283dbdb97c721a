// Application state (AppState)

use crate::announce::orchestrator::Announcer;
use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::stores::peer_store::{MemoryPeerStore, PeerStorage};
use std::sync::Arc;

/// Shared application state
///
/// Built once by the process entry point and handed to every request
/// handler. All fields are wrapped in Arc for cheap cloning across threads.
#[derive(Clone)]
pub struct AppState {
    /// Announce orchestrator bound to `storage`
    pub announcer: Arc<Announcer>,

    /// Peer storage collaborator
    pub storage: Arc<dyn PeerStorage>,

    /// Metrics collector for tracking statistics
    pub metrics: Arc<Metrics>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// State backed by the in-memory peer store.
    pub fn new(config: Config) -> Self {
        Self::with_storage(config, Arc::new(MemoryPeerStore::new()))
    }

    pub fn with_storage(config: Config, storage: Arc<dyn PeerStorage>) -> Self {
        let config = Arc::new(config);
        let metrics = Arc::new(Metrics::new());

        let announcer = Arc::new(Announcer::new(
            Arc::clone(&storage),
            Arc::clone(&metrics),
            &config.tracker,
        ));

        Self {
            announcer,
            storage,
            metrics,
            config,
        }
    }
}
