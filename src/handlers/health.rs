use crate::core::state::AppState;
use crate::utils::time::current_timestamp;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: i64,
    pub peers: usize,
    pub torrents: usize,
}

/// GET /health: liveness plus the size of the peer store.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let stats = state.storage.stats().await;

    Json(HealthReport {
        status: "ok".to_string(),
        timestamp: current_timestamp(),
        peers: stats.peers,
        torrents: stats.torrents,
    })
}
