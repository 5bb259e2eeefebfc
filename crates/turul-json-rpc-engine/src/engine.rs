//! # Protocol Engine
//!
//! Ties the pieces together: outbound `call`/`notify`, inbound `receive`
//! with dispatch to the installed method resolver, response correlation, and
//! the poisoned state that fails every pending and future operation.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use turul_json_rpc_engine::prelude::*;
//!
//! # async fn example() -> Result<(), EngineError> {
//! let engine = Arc::new(JsonRpcEngine::new(FunctionTransport::new(
//!     |payload: String, _is_request: bool| async move {
//!         println!("-> {}", payload);
//!         Ok(())
//!     },
//! )));
//!
//! engine.serve(MethodRegistry::new().with_fn("ping", |_params| async {
//!     Ok(json!("pong"))
//! }));
//!
//! // Text decoded by the embedder's framing layer
//! engine
//!     .receive(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, true)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, MethodError, RpcError};
use crate::handler::{FunctionResolver, JsonRpcMethod, MethodRegistry, MethodResolver};
use crate::id::{IdGenerator, generator_from_config};
use crate::notification::JsonRpcNotification;
use crate::payload::{JsonRpcEnvelope, request_id_of};
use crate::pending::{self, CallOutcome, PendingCalls};
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcMessage;
use crate::transport::{DisconnectedTransport, FunctionTransport, Transport};
use crate::types::RequestId;

const DEFAULT_LABEL: &str = "json-rpc";

/// Health of an engine
#[derive(Debug, Clone)]
pub enum EngineState {
    Healthy,
    /// Every operation fails fast with the contained error
    Poisoned(EngineError),
}

impl EngineState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, EngineState::Healthy)
    }
}

/// Counters for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStatistics {
    /// Requests handed to the transport
    pub requests_sent: u64,
    /// Notifications handed to the transport
    pub notifications_sent: u64,
    /// Responses (success or error) handed to the transport
    pub responses_sent: u64,
    /// Well-formed responses received
    pub responses_received: u64,
    /// Received responses that matched no pending call
    pub unmatched_responses: u64,
    /// Transport sends that failed
    pub send_failures: u64,
}

/// Transport-agnostic JSON-RPC 2.0 peer
pub struct JsonRpcEngine {
    transport: Arc<dyn Transport>,
    ids: Box<dyn IdGenerator>,
    resolver: RwLock<Arc<dyn MethodResolver>>,
    poison: RwLock<Option<EngineError>>,
    pending: PendingCalls,
    stats: Mutex<EngineStatistics>,
    config: EngineConfig,
}

impl JsonRpcEngine {
    /// Create an engine with default configuration around `transport`
    pub fn new<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        JsonRpcEngineBuilder::new().with_transport(transport).build()
    }

    pub fn builder() -> JsonRpcEngineBuilder {
        JsonRpcEngineBuilder::new()
    }

    /// Issue a request and wait for the matching response.
    ///
    /// Fails immediately when the engine is poisoned or the transport
    /// rejects the envelope; in both cases no pending entry is left behind.
    pub async fn call(&self, method: impl Into<String>, params: Vec<Value>) -> EngineResult<Value> {
        self.check_healthy()?;

        let id = self.ids.next_id();
        let request = JsonRpcRequest::new(id.clone(), method, params);
        let payload = serde_json::to_string(&request)?;

        debug!(
            engine = %self.label(),
            id = %id,
            method = %request.method,
            "Sending request"
        );

        // Registered before the send so a response echoed during the send
        // finds its entry. The guard removes the entry if the send fails or
        // this future is dropped before the call settles.
        let (completion, receiver) = pending::completion();
        let guard = self.pending.register_guarded(id.clone(), completion);

        if let Err(error) = self.transmit(payload, true).await {
            debug!(engine = %self.label(), id = %id, error = %error, "Request not sent");
            return Err(error);
        }
        self.stats.lock().requests_sent += 1;

        let outcome = match receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(EngineError::Canceled),
        };
        guard.disarm();
        outcome
    }

    /// [`call`](Self::call) and deserialize the result into `R`
    pub async fn call_as<R>(&self, method: impl Into<String>, params: Vec<Value>) -> EngineResult<R>
    where
        R: DeserializeOwned,
    {
        let value = self.call(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a notification. No response is expected and nothing is tracked.
    pub async fn notify(&self, method: impl Into<String>, params: Vec<Value>) -> EngineResult<()> {
        let notification = JsonRpcNotification::new(method, params);
        let payload = serde_json::to_string(&notification)?;

        debug!(
            engine = %self.label(),
            method = %notification.method,
            "Sending notification"
        );

        self.transmit(payload, true).await?;
        self.stats.lock().notifications_sent += 1;
        Ok(())
    }

    /// Process one inbound envelope.
    ///
    /// `is_request` states the direction: `true` for requests and
    /// notifications sent by the peer, `false` for responses to our calls.
    ///
    /// Problems with a request that carries an id are answered over the
    /// wire and this returns `Ok`. Problems nobody can be told about
    /// (notifications, unparseable text, malformed responses) are returned.
    pub async fn receive(&self, text: &str, is_request: bool) -> EngineResult<()> {
        if self.config.logging.log_payloads {
            trace!(engine = %self.label(), is_request, payload = %text, "Inbound envelope");
        }

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                let error = RpcError::parse_error(format!("Parse error: {}", e));
                return self.reject_inbound(error, None, is_request).await;
            }
        };

        let id_hint = request_id_of(&value);
        let envelope = match JsonRpcEnvelope::from_value(value, is_request) {
            Ok(envelope) => envelope,
            Err(error) => return self.reject_inbound(error, id_hint, is_request).await,
        };

        match envelope {
            JsonRpcEnvelope::Request(request) => {
                self.handle_request(Some(request.id), request.method, request.params)
                    .await
            }
            JsonRpcEnvelope::Notification(notification) => {
                self.handle_request(None, notification.method, notification.params)
                    .await
            }
            JsonRpcEnvelope::Response(response) => {
                self.handle_response(Some(response.id), Ok(response.result));
                Ok(())
            }
            JsonRpcEnvelope::Error(error) => {
                let outcome = Err(RpcError::from_error_object(error.error).into());
                self.handle_response(error.id, outcome);
                Ok(())
            }
        }
    }

    /// Install or replace the method resolver. Pending calls are unaffected.
    pub fn serve<R>(&self, resolver: R)
    where
        R: MethodResolver + 'static,
    {
        self.serve_shared(Arc::new(resolver));
    }

    /// Install a resolver that is shared with other owners
    pub fn serve_shared(&self, resolver: Arc<dyn MethodResolver>) {
        *self.resolver.write() = resolver;
        debug!(engine = %self.label(), "Method resolver installed");
    }

    /// Install a lookup closure as the resolver
    pub fn serve_fn<F>(&self, resolve_fn: F)
    where
        F: Fn(&str) -> Option<Arc<dyn JsonRpcMethod>> + Send + Sync + 'static,
    {
        self.serve(FunctionResolver::new(resolve_fn));
    }

    /// Poison (`Some`) or heal (`None`) the engine.
    ///
    /// Poisoning rejects every pending call with `error` and makes all later
    /// sends fail with it without touching the transport.
    pub fn set_error(&self, error: Option<EngineError>) {
        match error {
            Some(error) => {
                *self.poison.write() = Some(error.clone());
                let drained = self.pending.drain_all(&error);
                warn!(engine = %self.label(), error = %error, drained, "Engine poisoned");
            }
            None => {
                *self.poison.write() = None;
                debug!(engine = %self.label(), "Engine healthy");
            }
        }
    }

    /// The poison error, if any
    pub fn error(&self) -> Option<EngineError> {
        self.poison.read().clone()
    }

    pub fn state(&self) -> EngineState {
        match self.error() {
            Some(error) => EngineState::Poisoned(error),
            None => EngineState::Healthy,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poison.read().is_some()
    }

    /// Number of calls waiting for a response
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    pub fn supported_methods(&self) -> Vec<String> {
        self.resolver.read().supported_methods()
    }

    pub fn statistics(&self) -> EngineStatistics {
        self.stats.lock().clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    fn label(&self) -> &str {
        self.name().unwrap_or(DEFAULT_LABEL)
    }

    fn check_healthy(&self) -> EngineResult<()> {
        match &*self.poison.read() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn transmit(&self, payload: String, is_request: bool) -> EngineResult<()> {
        self.check_healthy()?;

        if self.config.logging.log_payloads {
            trace!(engine = %self.label(), is_request, payload = %payload, "Outbound envelope");
        }

        self.transport
            .send(payload, is_request)
            .await
            .map_err(|error| {
                self.stats.lock().send_failures += 1;
                EngineError::Transport(error)
            })
    }

    async fn respond(&self, message: JsonRpcMessage) -> EngineResult<()> {
        let payload = serde_json::to_string(&message)?;

        if let Err(error) = self.transmit(payload, false).await {
            warn!(
                engine = %self.label(),
                id = ?message.id(),
                error = %error,
                "Failed to send response"
            );
            return Err(error);
        }
        self.stats.lock().responses_sent += 1;
        Ok(())
    }

    /// Route a structural failure of inbound text: answer the peer when the
    /// request is addressable, otherwise hand the error back.
    async fn reject_inbound(
        &self,
        error: RpcError,
        id: Option<RequestId>,
        is_request: bool,
    ) -> EngineResult<()> {
        debug!(
            engine = %self.label(),
            is_request,
            code = error.code(),
            reason = %error.message,
            "Rejected inbound envelope"
        );

        match (is_request, id) {
            (true, Some(id)) => {
                self.respond(JsonRpcMessage::error(error.as_payload(Some(id))))
                    .await
            }
            _ => Err(error.into()),
        }
    }

    async fn handle_request(
        &self,
        id: Option<RequestId>,
        method: String,
        params: Vec<Value>,
    ) -> EngineResult<()> {
        let resolver = self.resolver.read().clone();

        let Some(implementation) = resolver.resolve(&method) else {
            debug!(engine = %self.label(), id = ?id, method = %method, "Method not found");
            let error = RpcError::method_not_found();
            return match id {
                Some(id) => {
                    self.respond(JsonRpcMessage::error(error.as_payload(Some(id))))
                        .await
                }
                None => Err(error.into()),
            };
        };

        debug!(engine = %self.label(), id = ?id, method = %method, "Dispatching");

        let outcome = AssertUnwindSafe(implementation.call(params))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(MethodError::msg(panic_message(panic.as_ref()))));

        match (outcome, id) {
            (Ok(result), Some(id)) => self.respond(JsonRpcMessage::success(id, result)).await,
            (Ok(_), None) => Ok(()),
            (Err(error), Some(id)) => {
                let error = error.into_rpc_error();
                debug!(
                    engine = %self.label(),
                    id = %id,
                    method = %method,
                    code = error.code(),
                    "Method failed"
                );
                self.respond(JsonRpcMessage::error(error.as_payload(Some(id))))
                    .await
            }
            (Err(error), None) => {
                debug!(engine = %self.label(), method = %method, error = %error, "Notification handler failed");
                Err(error.into())
            }
        }
    }

    fn handle_response(&self, id: Option<RequestId>, outcome: CallOutcome) {
        let matched = id
            .as_ref()
            .is_some_and(|id| self.pending.complete(id, outcome));

        let mut stats = self.stats.lock();
        stats.responses_received += 1;
        if !matched {
            stats.unmatched_responses += 1;
            drop(stats);
            if self.config.logging.log_unmatched_responses {
                debug!(engine = %self.label(), id = ?id, "Discarding unmatched response");
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("method panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("method panicked: {}", message)
    } else {
        "method panicked".to_string()
    }
}

/// Builder for [`JsonRpcEngine`]
#[derive(Default)]
pub struct JsonRpcEngineBuilder {
    transport: Option<Arc<dyn Transport>>,
    ids: Option<Box<dyn IdGenerator>>,
    resolver: Option<Arc<dyn MethodResolver>>,
    config: EngineConfig,
}

impl JsonRpcEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use an async closure as the transport send function
    pub fn with_send_fn<F, Fut>(self, send_fn: F) -> Self
    where
        F: Fn(String, bool) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), crate::error::TransportError>>
            + Send
            + 'static,
    {
        self.with_transport(FunctionTransport::new(send_fn))
    }

    /// Override the id strategy from the config
    pub fn with_id_generator<G>(mut self, ids: G) -> Self
    where
        G: IdGenerator + 'static,
    {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: MethodResolver + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn build(self) -> JsonRpcEngine {
        let ids = self
            .ids
            .unwrap_or_else(|| generator_from_config(&self.config.ids));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(DisconnectedTransport));
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(MethodRegistry::new()));

        JsonRpcEngine {
            transport,
            ids,
            resolver: RwLock::new(resolver),
            poison: RwLock::new(None),
            pending: PendingCalls::new(),
            stats: Mutex::new(EngineStatistics::default()),
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{JsonRpcErrorCode, TransportError};
    use crate::id::PrefixedIdGenerator;
    use serde_json::json;
    use std::time::Duration;
    use tracing_test::traced_test;

    type Outbox = Arc<Mutex<Vec<(String, bool)>>>;

    fn recording_engine() -> (Arc<JsonRpcEngine>, Outbox) {
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
        let sink = outbox.clone();
        let engine = JsonRpcEngine::builder()
            .with_send_fn(move |payload, is_request| {
                sink.lock().push((payload, is_request));
                async { Ok(()) }
            })
            .build();
        (Arc::new(engine), outbox)
    }

    async fn wait_for_pending(engine: &JsonRpcEngine, count: usize) {
        while engine.pending_calls() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_call_resolves_with_result() {
        let (engine, outbox) = recording_engine();

        let caller = engine.clone();
        let call = tokio::spawn(async move { caller.call("add", vec![json!(2), json!(3)]).await });
        wait_for_pending(&engine, 1).await;

        assert_eq!(
            outbox.lock()[0],
            (
                r#"{"jsonrpc":"2.0","id":0,"method":"add","params":[2,3]}"#.to_string(),
                true
            )
        );

        engine
            .receive(r#"{"jsonrpc":"2.0","id":0,"result":5}"#, false)
            .await
            .unwrap();

        assert_eq!(call.await.unwrap().unwrap(), json!(5));
        assert_eq!(engine.pending_calls(), 0);
        assert_eq!(engine.statistics().requests_sent, 1);
        assert_eq!(engine.statistics().responses_received, 1);
    }

    #[tokio::test]
    async fn test_call_rejects_with_error_response() {
        let (engine, _outbox) = recording_engine();

        let caller = engine.clone();
        let call = tokio::spawn(async move { caller.call("div", vec![json!(1), json!(0)]).await });
        wait_for_pending(&engine, 1).await;

        engine
            .receive(
                r#"{"jsonrpc":"2.0","id":0,"error":{"code":-32000,"message":"division by zero"}}"#,
                false,
            )
            .await
            .unwrap();

        let error = call.await.unwrap().unwrap_err();
        let rpc = error.as_rpc().unwrap();
        assert_eq!(rpc.code(), -32000);
        assert_eq!(rpc.message, "division by zero");
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_no_pending_entry() {
        let engine = JsonRpcEngine::builder()
            .with_send_fn(|_, _| async { Err(TransportError::SendFailed("broken pipe".into())) })
            .build();

        let error = engine.call("x", vec![]).await.unwrap_err();
        assert!(matches!(
            error,
            EngineError::Transport(TransportError::SendFailed(_))
        ));
        assert_eq!(engine.pending_calls(), 0);
        assert_eq!(engine.statistics().send_failures, 1);
    }

    #[tokio::test]
    async fn test_abandoned_calls_release_their_entries() {
        let (engine, outbox) = recording_engine();

        for _ in 0..100 {
            let timed_out =
                tokio::time::timeout(Duration::from_millis(1), engine.call("slow", vec![])).await;
            assert!(timed_out.is_err());
        }

        assert_eq!(outbox.lock().len(), 100);
        assert_eq!(engine.pending_calls(), 0);

        // A late reply to an abandoned call is simply unmatched
        engine
            .receive(r#"{"jsonrpc":"2.0","id":5,"result":"late"}"#, false)
            .await
            .unwrap();
        assert_eq!(engine.statistics().unmatched_responses, 1);
    }

    #[tokio::test]
    async fn test_call_dropped_during_send_releases_entry() {
        let engine = Arc::new(
            JsonRpcEngine::builder()
                .with_send_fn(|_, _| futures::future::pending::<Result<(), TransportError>>())
                .build(),
        );

        let caller = engine.clone();
        let call = tokio::spawn(async move { caller.call("stuck", vec![]).await });
        wait_for_pending(&engine, 1).await;

        call.abort();
        assert!(call.await.unwrap_err().is_cancelled());
        assert_eq!(engine.pending_calls(), 0);
    }

    #[tokio::test]
    async fn test_default_transport_is_closed() {
        let engine = JsonRpcEngine::builder().build();
        let error = engine.notify("x", vec![]).await.unwrap_err();
        assert!(matches!(error, EngineError::Transport(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_notify_never_registers() {
        let (engine, outbox) = recording_engine();

        engine.notify("log", vec![json!("hi")]).await.unwrap();
        assert_eq!(engine.pending_calls(), 0);
        assert_eq!(
            outbox.lock()[0].0,
            r#"{"jsonrpc":"2.0","method":"log","params":["hi"]}"#
        );
        assert_eq!(engine.statistics().notifications_sent, 1);
    }

    #[tokio::test]
    async fn test_set_error_drains_and_blocks() {
        let (engine, outbox) = recording_engine();

        let caller = engine.clone();
        let call = tokio::spawn(async move { caller.call("slow", vec![]).await });
        wait_for_pending(&engine, 1).await;

        engine.set_error(Some(EngineError::disconnected("lost")));
        assert!(engine.is_poisoned());
        assert!(!engine.state().is_healthy());

        let error = call.await.unwrap().unwrap_err();
        assert!(matches!(error, EngineError::Disconnected(ref r) if r == "lost"));

        let sent_before = outbox.lock().len();
        let error = engine.call("again", vec![]).await.unwrap_err();
        assert!(matches!(error, EngineError::Disconnected(ref r) if r == "lost"));
        let error = engine.notify("again", vec![]).await.unwrap_err();
        assert!(matches!(error, EngineError::Disconnected(ref r) if r == "lost"));
        assert_eq!(outbox.lock().len(), sent_before);

        engine.set_error(None);
        assert!(engine.state().is_healthy());
        engine.notify("again", vec![]).await.unwrap();
        assert_eq!(outbox.lock().len(), sent_before + 1);
    }

    #[tokio::test]
    async fn test_method_not_found_response() {
        let (engine, outbox) = recording_engine();
        engine.serve_fn(|_| None);

        engine
            .receive(r#"{"jsonrpc":"2.0","id":7,"method":"x","params":[]}"#, true)
            .await
            .unwrap();

        let sent = outbox.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            (
                r#"{"jsonrpc":"2.0","id":7,"error":{"code":-32601,"message":"Method not found"}}"#
                    .to_string(),
                false
            )
        );
    }

    #[tokio::test]
    async fn test_method_not_found_notification_surfaces() {
        let (engine, outbox) = recording_engine();

        let error = engine
            .receive(r#"{"jsonrpc":"2.0","method":"x"}"#, true)
            .await
            .unwrap_err();

        assert_eq!(error.error_code(), Some(-32601));
        assert!(outbox.lock().is_empty());
    }

    #[tokio::test]
    async fn test_zero_id_request_gets_a_reply() {
        let (engine, outbox) = recording_engine();
        engine.serve(MethodRegistry::new().with_fn("ping", |_| async { Ok(json!("pong")) }));

        engine
            .receive(r#"{"jsonrpc":"2.0","id":0,"method":"ping"}"#, true)
            .await
            .unwrap();

        assert_eq!(
            outbox.lock()[0].0,
            r#"{"jsonrpc":"2.0","id":0,"result":"pong"}"#
        );
    }

    #[tokio::test]
    async fn test_panicking_method_becomes_internal_error() {
        let (engine, outbox) = recording_engine();
        engine.serve(MethodRegistry::new().with_fn("boom", |_| async {
            if true {
                panic!("kaboom");
            }
            Ok(Value::Null)
        }));

        engine
            .receive(r#"{"jsonrpc":"2.0","id":"p","method":"boom"}"#, true)
            .await
            .unwrap();

        let sent: Value = serde_json::from_str(&outbox.lock()[0].0).unwrap();
        assert_eq!(sent["id"], "p");
        assert_eq!(sent["error"]["code"], JsonRpcErrorCode::InternalError.code());
        assert_eq!(sent["error"]["message"], "method panicked: kaboom");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unmatched_response_is_discarded() {
        let (engine, outbox) = recording_engine();

        engine
            .receive(r#"{"jsonrpc":"2.0","id":41,"result":"late"}"#, false)
            .await
            .unwrap();
        engine
            .receive(r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#, false)
            .await
            .unwrap();

        assert!(outbox.lock().is_empty());
        let stats = engine.statistics();
        assert_eq!(stats.responses_received, 2);
        assert_eq!(stats.unmatched_responses, 2);
        assert!(logs_contain("Discarding unmatched response"));
    }

    #[tokio::test]
    async fn test_custom_id_generator_and_call_as() {
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
        let sink = outbox.clone();
        let engine = Arc::new(
            JsonRpcEngine::builder()
                .with_id_generator(PrefixedIdGenerator::new("req_"))
                .with_send_fn(move |payload, is_request| {
                    sink.lock().push((payload, is_request));
                    async { Ok(()) }
                })
                .build(),
        );

        let caller = engine.clone();
        let call = tokio::spawn(async move { caller.call_as::<Vec<u32>>("list", vec![]).await });
        wait_for_pending(&engine, 1).await;

        assert!(outbox.lock()[0].0.contains(r#""id":"req_0""#));
        engine
            .receive(r#"{"jsonrpc":"2.0","id":"req_0","result":[1,2,3]}"#, false)
            .await
            .unwrap();

        assert_eq!(call.await.unwrap().unwrap(), vec![1, 2, 3]);
    }
}
