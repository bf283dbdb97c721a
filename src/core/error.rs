// Centralized error handling for the tracker

use crate::bencode::encoder::{encode, Value};
use crate::core::config::FailureMode;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The request cannot be interpreted into a peer
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid info_hash: expected 20 bytes, got {0}")]
    InvalidInfoHash(usize),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid percent-encoding in parameter: {0}")]
    InvalidEncoding(String),

    #[error("Unable to resolve address: {0}")]
    UnresolvableAddress(String),
}

/// A stored peer record that cannot be packed into compact form
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Peer address is not valid hex: {0}")]
    InvalidHex(String),

    #[error("Peer address has invalid length: {0} bytes")]
    InvalidAddressLength(usize),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Peer storage unavailable: {0}")]
    Unavailable(String),

    #[error("Peer record rejected: {0}")]
    InvalidRecord(String),
}

/// Errors that can occur during announce processing
#[derive(Error, Debug)]
pub enum AnnounceError {
    #[error("Invalid announce request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Corrupt peer data: {0}")]
    Codec(#[from] CodecError),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid endpoint. Valid endpoints: /announce, /health, /metrics")]
    UnknownEndpoint,
}

impl AnnounceError {
    /// Body sent to the client in place of a regular announce response.
    ///
    /// Failures are always answered with HTTP 200 and this body.
    pub fn failure_body(&self, mode: FailureMode) -> Vec<u8> {
        match mode {
            FailureMode::Legacy => b"error".to_vec(),
            FailureMode::Bencode => {
                let message = self.to_string();
                encode(&Value::Dict(vec![(
                    b"failure reason".to_vec(),
                    message.as_str().into(),
                )]))
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        match self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        }
    }
}
