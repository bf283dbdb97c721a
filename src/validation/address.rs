use crate::core::error::ValidationError;
use std::net::IpAddr;
use tracing::debug;

/// Whether an address belongs to a site-local range.
///
/// IPv4: `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`.
/// IPv6: `fec0::/10` (site-local) and `fc00::/7` (unique local).
/// Loopback and link-local addresses are not site-local.
pub fn is_site_local(ip: IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            (first & 0xffc0) == 0xfec0 || (first & 0xfe00) == 0xfc00
        }
    }
}

/// Resolve an address literal or hostname to a single canonical address.
pub async fn resolve_host(host: &str) -> Result<IpAddr, ValidationError> {
    let host = host.trim();
    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(ip.to_canonical());
    }

    if host.is_empty() {
        return Err(ValidationError::UnresolvableAddress(host.to_string()));
    }

    let mut addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|_| ValidationError::UnresolvableAddress(host.to_string()))?;

    addrs
        .next()
        .map(|addr| addr.ip().to_canonical())
        .ok_or_else(|| ValidationError::UnresolvableAddress(host.to_string()))
}

/// Pick the address recorded for an announcing peer.
///
/// The trusted proxy header takes precedence over the socket address. A
/// client-declared `ip` replaces it only when that connecting address is
/// site-local.
pub async fn resolve_peer_address(
    remote: IpAddr,
    proxy_address: Option<&str>,
    declared_ip: Option<&str>,
) -> Result<IpAddr, ValidationError> {
    let connecting = match proxy_address {
        Some(header) => resolve_host(header).await?,
        None => remote.to_canonical(),
    };

    match declared_ip {
        Some(declared) if is_site_local(connecting) => {
            let ip = resolve_host(declared).await?;
            debug!(connecting = %connecting, declared = %ip, "Honouring client-declared ip");
            Ok(ip)
        }
        Some(declared) => {
            debug!(connecting = %connecting, declared = %declared, "Ignoring client-declared ip from public address");
            Ok(connecting)
        }
        None => Ok(connecting),
    }
}
