use crate::core::error::ValidationError;
use crate::utils::url::url_decode;

/// Raw announce parameters after percent-decoding
///
/// Only the parameters the tracker acts on are kept. When a key repeats, the
/// first occurrence wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnounceParams {
    /// Raw `info_hash` bytes
    pub info_hash: Option<Vec<u8>>,

    /// Listening port as sent by the client
    pub port: Option<String>,

    /// Client-declared address or hostname
    pub ip: Option<String>,

    /// Lifecycle event; empty and unknown values are treated as absent
    pub event: Option<AnnounceEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceEvent {
    Started,
    Stopped,
    Completed,
}

impl AnnounceEvent {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "started" => Some(AnnounceEvent::Started),
            "stopped" => Some(AnnounceEvent::Stopped),
            "completed" => Some(AnnounceEvent::Completed),
            _ => None,
        }
    }
}

impl AnnounceParams {
    /// Parse an `application/x-www-form-urlencoded` byte string.
    pub fn parse(form: &[u8]) -> Result<Self, ValidationError> {
        let mut params = AnnounceParams::default();
        let mut event_seen = false;

        for pair in form.split(|&b| b == b'&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = match pair.iter().position(|&b| b == b'=') {
                Some(idx) => (&pair[..idx], &pair[idx + 1..]),
                None => (pair, &[][..]),
            };

            let key = match url_decode(raw_key) {
                Ok(key) => key,
                // A mangled key can never name a parameter we act on
                Err(_) => continue,
            };

            match key.as_slice() {
                b"info_hash" if params.info_hash.is_none() => {
                    params.info_hash = Some(decode_value("info_hash", raw_value)?);
                }
                b"port" if params.port.is_none() => {
                    params.port = Some(decode_text("port", raw_value)?);
                }
                b"ip" if params.ip.is_none() => {
                    params.ip = Some(decode_text("ip", raw_value)?);
                }
                b"event" if !event_seen => {
                    event_seen = true;
                    params.event = AnnounceEvent::parse(&decode_text("event", raw_value)?);
                }
                _ => {}
            }
        }

        Ok(params)
    }

    /// Hex form of the required 20-byte `info_hash`.
    pub fn info_hash_hex(&self) -> Result<String, ValidationError> {
        let bytes = self
            .info_hash
            .as_ref()
            .ok_or(ValidationError::MissingParameter("info_hash"))?;

        if bytes.len() != 20 {
            return Err(ValidationError::InvalidInfoHash(bytes.len()));
        }

        Ok(hex::encode(bytes))
    }

    /// The declared port, or `fallback` when the client sent none.
    pub fn resolve_port(&self, fallback: u16) -> Result<u16, ValidationError> {
        match &self.port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| ValidationError::InvalidPort(port.clone())),
            None => Ok(fallback),
        }
    }
}

fn decode_value(name: &str, raw: &[u8]) -> Result<Vec<u8>, ValidationError> {
    url_decode(raw).map_err(|_| ValidationError::InvalidEncoding(name.to_string()))
}

fn decode_text(name: &str, raw: &[u8]) -> Result<String, ValidationError> {
    let bytes = decode_value(name, raw)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
