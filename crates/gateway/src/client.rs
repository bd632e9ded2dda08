use std::sync::Arc;
use std::time::Duration;

use quietfeed_core::PostId;

use crate::error::TransportError;
use crate::relay::{Ack, RelayRequest, RelayResponse, Transport};

/// Page-side client for the two classification operations.
///
/// Both calls suspend on the transport; neither mutates any pipeline
/// state. Callers decide what a failure means: the scanner treats it as
/// "unknown", the report control surfaces it to the user.
pub struct Gateway {
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl Gateway {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport, timeout: None }
    }

    /// Stamp every outgoing request with an explicit timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether the service already holds a moderation verdict for `id`.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the relay or network fails; the
    /// verdict is then unknown, not negative.
    pub async fn lookup(&self, id: &PostId) -> Result<bool, TransportError> {
        match self.transport.send(self.request(RelayRequest::check(id.clone()))).await? {
            RelayResponse::Verdict(verdict) => Ok(verdict),
            other => Err(TransportError::UnexpectedResponse(format!(
                "expected verdict for lookup, got {other:?}"
            ))),
        }
    }

    /// Record a moderation verdict for `id` at the service. Idempotent
    /// at the service; repeated reports for the same id are safe.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the relay or network fails.
    pub async fn report(&self, id: &PostId) -> Result<Ack, TransportError> {
        match self.transport.send(self.request(RelayRequest::report(id.clone()))).await? {
            RelayResponse::Ack(ack) => Ok(ack),
            other => Err(TransportError::UnexpectedResponse(format!(
                "expected ack for report, got {other:?}"
            ))),
        }
    }

    fn request(&self, request: RelayRequest) -> RelayRequest {
        match self.timeout {
            Some(timeout) => request.with_timeout(timeout),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Transport answering from a script, recording every request.
    struct ScriptedTransport {
        replies: Mutex<Vec<Result<RelayResponse, TransportError>>>,
        requests: Mutex<Vec<RelayRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<RelayResponse, TransportError>>) -> Self {
            Self { replies: Mutex::new(replies), requests: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: RelayRequest) -> Result<RelayResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.replies.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn test_lookup_returns_verdict() {
        let transport =
            Arc::new(ScriptedTransport::new(vec![Ok(RelayResponse::Verdict(true))]));
        let gateway = Gateway::new(Arc::clone(&transport) as Arc<dyn Transport>);

        assert!(gateway.lookup(&PostId::from("1")).await.unwrap());

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0], RelayRequest::check(PostId::from("1")));
    }

    #[tokio::test]
    async fn test_report_returns_ack() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(RelayResponse::Ack(Ack(true)))]));
        let gateway = Gateway::new(Arc::clone(&transport) as Arc<dyn Transport>);

        assert_eq!(gateway.report(&PostId::from("2")).await.unwrap(), Ack(true));

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0], RelayRequest::report(PostId::from("2")));
    }

    #[tokio::test]
    async fn test_lookup_rejects_mismatched_response() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(RelayResponse::Ack(Ack(true)))]));
        let gateway = Gateway::new(Arc::clone(&transport) as Arc<dyn Transport>);

        let err = gateway.lookup(&PostId::from("3")).await.unwrap_err();
        assert!(matches!(err, TransportError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_gateway_timeout_stamps_requests() {
        let transport =
            Arc::new(ScriptedTransport::new(vec![Ok(RelayResponse::Verdict(false))]));
        let gateway = Gateway::new(Arc::clone(&transport) as Arc<dyn Transport>)
            .with_timeout(Duration::from_secs(5));

        gateway.lookup(&PostId::from("4")).await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].timeout(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::Relay(
            "relay down".to_owned(),
        ))]));
        let gateway = Gateway::new(Arc::clone(&transport) as Arc<dyn Transport>);

        let err = gateway.lookup(&PostId::from("5")).await.unwrap_err();
        assert!(matches!(err, TransportError::Relay(_)));
    }
}
