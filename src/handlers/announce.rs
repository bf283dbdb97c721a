use crate::announce::interpreter::AnnounceRequest;
use crate::core::state::AppState;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::instrument;

/// Main announce handler
///
/// Accepts GET query strings and, for POST, form-encoded bodies. Always
/// answers 200 with a `text/plain` bencoded body; failures are reported
/// inside the body, never as an HTTP error.
#[instrument(skip(state, raw_query, headers, body))]
pub async fn announce_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Response {
    let mut form = raw_query.map(String::into_bytes).unwrap_or_default();

    if is_form_body(&headers) && !body.is_empty() {
        if !form.is_empty() {
            form.push(b'&');
        }
        form.extend_from_slice(&body);
    }

    let mut request = AnnounceRequest::new(form, addr);

    if let Some(name) = state.config.tracker.real_ip_header.as_deref() {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            request = request.with_proxy_address(value.trim());
        }
    }

    let reply = state.announcer.handle(&request).await;

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], reply).into_response()
}

fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
