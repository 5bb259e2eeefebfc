//! Transport seam.
//!
//! The engine never touches sockets or framing. It hands each serialized
//! envelope to a [`Transport`] supplied by the embedder, which delivers it to
//! the peer or fails. Inbound text comes back through
//! [`JsonRpcEngine::receive`](crate::JsonRpcEngine::receive).

use std::future::Future;

use async_trait::async_trait;

use crate::error::TransportError;

/// Outbound half of a connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one serialized envelope.
    ///
    /// `is_request` is `true` for requests and notifications and `false`
    /// for responses. The engine does not retry failed sends.
    async fn send(&self, payload: String, is_request: bool) -> Result<(), TransportError>;
}

/// A simple function-based transport
pub struct FunctionTransport<F> {
    send_fn: F,
}

impl<F, Fut> FunctionTransport<F>
where
    F: Fn(String, bool) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), TransportError>> + Send + 'static,
{
    pub fn new(send_fn: F) -> Self {
        Self { send_fn }
    }
}

#[async_trait]
impl<F, Fut> Transport for FunctionTransport<F>
where
    F: Fn(String, bool) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), TransportError>> + Send + 'static,
{
    async fn send(&self, payload: String, is_request: bool) -> Result<(), TransportError> {
        (self.send_fn)(payload, is_request).await
    }
}

/// Transport used until one is installed; every send fails with `Closed`
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedTransport;

#[async_trait]
impl Transport for DisconnectedTransport {
    async fn send(&self, _payload: String, _is_request: bool) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_function_transport_forwards_payload() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = sent.clone();
        let transport = FunctionTransport::new(move |payload: String, is_request: bool| {
            sink.lock().push((payload, is_request));
            async { Ok(()) }
        });

        transport.send("{}".to_string(), true).await.unwrap();
        assert_eq!(sent.lock().as_slice(), &[("{}".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_disconnected_transport_fails() {
        let err = DisconnectedTransport.send("{}".to_string(), false).await.unwrap_err();
        assert_eq!(err, TransportError::Closed);
    }
}
