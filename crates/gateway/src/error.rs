//! Typed error enum for the gateway crate.

use std::time::Duration;

use thiserror::Error;

/// Errors from relay and remote-service operations.
///
/// These are transport failures, never domain verdicts: the scanner
/// treats any of them as "unknown, do not moderate, do not persist".
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("relay error: {0}")]
    Relay(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}
