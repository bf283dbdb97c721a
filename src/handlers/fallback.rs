use crate::core::error::AnnounceError;
use crate::core::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

const BROWSER_MARKERS: [&str; 5] = ["Mozilla", "Chrome", "Safari", "Firefox", "Edge"];

pub async fn fallback_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if BROWSER_MARKERS.iter().any(|marker| user_agent.contains(marker)) {
        return Html("Nothing to see here. Lost in the void!").into_response();
    }

    // Torrent clients get a failure body in the configured format
    let body = AnnounceError::UnknownEndpoint.failure_body(state.config.tracker.failure_mode);
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}
