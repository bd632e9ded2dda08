use std::time::Duration;

use async_trait::async_trait;
use quietfeed_core::PostId;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Tagged request crossing the transport boundary.
///
/// The action tags are the legacy wire names and must not change while
/// existing relays speak them. Timeout is an explicit field of the
/// contract; a relay that supports it enforces it, one that does not may
/// ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum RelayRequest {
    #[serde(rename = "checkTweetId")]
    Check {
        id: PostId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    #[serde(rename = "addTweetId")]
    Report {
        id: PostId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
}

impl RelayRequest {
    #[must_use]
    pub fn check(id: PostId) -> Self {
        Self::Check { id, timeout_ms: None }
    }

    #[must_use]
    pub fn report(id: PostId) -> Self {
        Self::Report { id, timeout_ms: None }
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        match self {
            Self::Check { id, .. } => Self::Check { id, timeout_ms: Some(ms) },
            Self::Report { id, .. } => Self::Report { id, timeout_ms: Some(ms) },
        }
    }

    #[must_use]
    pub fn id(&self) -> &PostId {
        match self {
            Self::Check { id, .. } | Self::Report { id, .. } => id,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Self::Check { timeout_ms, .. } | Self::Report { timeout_ms, .. } => {
                timeout_ms.map(Duration::from_millis)
            }
        }
    }
}

/// Successful relay result: a verdict for `Check`, an ack for `Report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayResponse {
    Verdict(bool),
    Ack(Ack),
}

/// Acknowledgement payload from a report. The service answers with its
/// own post-report decidability, which callers are free to ignore;
/// a successful report is applied locally either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ack(pub bool);

/// Error payload as it travels over a serialized relay boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayError {
    pub error: String,
}

impl From<RelayError> for TransportError {
    fn from(e: RelayError) -> Self {
        Self::Relay(e.error)
    }
}

/// Typed request/response transport between the page-side gateway and
/// the privileged network-capable context.
///
/// Completion order across concurrently issued calls is not guaranteed
/// and must not be assumed by any caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RelayRequest) -> Result<RelayResponse, TransportError>;
}
