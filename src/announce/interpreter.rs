use crate::core::error::ValidationError;
use crate::models::peer::Peer;
use crate::utils::time::expiry_after_interval;
use crate::validation::address::resolve_peer_address;
use crate::validation::params::{AnnounceEvent, AnnounceParams};
use std::net::SocketAddr;

/// Everything the transport hands over for one announce.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    /// Form-encoded parameters (query string, plus form body for POST)
    pub form: Vec<u8>,
    /// Socket address of the connection
    pub remote: SocketAddr,
    /// Client address reported by the trusted reverse proxy, if any
    pub proxy_address: Option<String>,
}

impl AnnounceRequest {
    pub fn new(form: impl Into<Vec<u8>>, remote: SocketAddr) -> Self {
        Self {
            form: form.into(),
            remote,
            proxy_address: None,
        }
    }

    pub fn with_proxy_address(mut self, proxy_address: impl Into<String>) -> Self {
        self.proxy_address = Some(proxy_address.into());
        self
    }
}

/// Turn an announce into the peer record it describes.
///
/// Nothing is returned unless every parameter validates.
pub async fn interpret(
    request: &AnnounceRequest,
    interval: u32,
    now_millis: i64,
) -> Result<Peer, ValidationError> {
    let params = AnnounceParams::parse(&request.form)?;

    let info_hash = params.info_hash_hex()?;
    let port = params.resolve_port(request.remote.port())?;
    let ip = resolve_peer_address(
        request.remote.ip(),
        request.proxy_address.as_deref(),
        params.ip.as_deref(),
    )
    .await?;

    let expires = match params.event {
        Some(AnnounceEvent::Stopped) => now_millis,
        _ => expiry_after_interval(now_millis, interval),
    };
    let complete = params.event == Some(AnnounceEvent::Completed);

    Ok(Peer::new(info_hash, ip, port, complete, expires))
}
