use std::time::Duration;

use async_trait::async_trait;
use quietfeed_core::PostId;
use serde_json::json;

use crate::error::TransportError;
use crate::relay::{Ack, RelayRequest, RelayResponse, Transport};

/// Default whole-request timeout applied at the HTTP client level.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpRelayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpRelayConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Privileged-side transport: performs the actual service calls.
///
/// `GET {base}/api/tweet/{id}` answers a check with a JSON bool verdict;
/// `POST {base}/api/tweet` with `{"id": …}` answers a report with a JSON
/// bool ack. No retries; the pipeline's retry unit is the next scan
/// trigger, and manual reports surface failure to the user instead.
pub struct HttpRelay {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelay {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// failure).
    pub fn new(config: HttpRelayConfig) -> Result<Self, TransportError> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(&self, id: &PostId) -> Result<bool, TransportError> {
        let response =
            self.client.get(format!("{}/api/tweet/{id}", self.base_url)).send().await?;
        let body = read_success_body(response, "verdict").await?;
        serde_json::from_str(&body).map_err(|e| TransportError::JsonParse {
            context: format!("verdict response (body: {})", truncate(&body, 200)),
            source: e,
        })
    }

    async fn report(&self, id: &PostId) -> Result<Ack, TransportError> {
        let response = self
            .client
            .post(format!("{}/api/tweet", self.base_url))
            .json(&json!({ "id": id }))
            .send()
            .await?;
        let body = read_success_body(response, "ack").await?;
        serde_json::from_str(&body).map_err(|e| TransportError::JsonParse {
            context: format!("ack response (body: {})", truncate(&body, 200)),
            source: e,
        })
    }
}

#[async_trait]
impl Transport for HttpRelay {
    async fn send(&self, request: RelayRequest) -> Result<RelayResponse, TransportError> {
        let call = async {
            match &request {
                RelayRequest::Check { id, .. } => self.check(id).await.map(RelayResponse::Verdict),
                RelayRequest::Report { id, .. } => self.report(id).await.map(RelayResponse::Ack),
            }
        };
        match request.timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => call.await,
        }
    }
}

async fn read_success_body(
    response: reqwest::Response,
    what: &str,
) -> Result<String, TransportError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        tracing::warn!(code = status.as_u16(), what, "service returned error status");
        Err(TransportError::HttpStatus { code: status.as_u16(), body })
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
