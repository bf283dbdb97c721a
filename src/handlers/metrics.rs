// Metrics endpoint

use crate::core::error::MonitoringError;
use crate::core::state::AppState;
use crate::utils::auth::verify_api_key;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    pub api_key: Option<String>,
}

/// Returns JSON with announce counters, failure breakdown, success rate,
/// active peers and torrents, uptime and requests per second.
///
/// Requires the configured API key when one is set.
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsQuery>,
) -> Result<Response, MonitoringError> {
    if let Some(expected) = state.config.metrics.api_key.as_deref() {
        let provided = params.api_key.as_deref().unwrap_or("");
        if !verify_api_key(provided, expected) {
            warn!("Unauthorized metrics access attempt");
            return Err(MonitoringError::InvalidApiKey);
        }
    }

    let snapshot = state.metrics.get_snapshot(state.storage.stats().await);

    Ok((StatusCode::OK, Json(snapshot)).into_response())
}
