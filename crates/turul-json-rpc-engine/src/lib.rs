//! # JSON-RPC 2.0 Engine
//!
//! A transport-agnostic JSON-RPC 2.0 peer. The embedder supplies a send
//! function and feeds decoded envelope text back in; the engine takes care of
//! everything in between.
//!
//! ## Features
//! - Outbound calls with per-engine id generation and response correlation
//! - Outbound notifications
//! - Inbound request dispatch to a replaceable method resolver
//! - Standard JSON-RPC error taxonomy with structured application errors
//! - Poisoned state that fails every pending and future call at once
//!
//! Framing, sockets, batching, retries and timeouts are left to the embedder.

pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod id;
pub mod notification;
pub mod payload;
pub mod pending;
pub mod prelude;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

// Re-export main types
pub use config::{EngineConfig, IdConfig, LoggingConfig};
pub use engine::{EngineState, EngineStatistics, JsonRpcEngine, JsonRpcEngineBuilder};
pub use error::{
    EngineError, EngineResult, JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, MethodError,
    RpcError, TransportError,
};
pub use handler::{
    FunctionMethod, FunctionResolver, JsonRpcMethod, MethodRegistry, MethodResolver, method_fn,
};
pub use id::{IdGenerator, PrefixedIdGenerator, SequentialIdGenerator};
pub use notification::JsonRpcNotification;
pub use payload::{JsonRpcEnvelope, validate};
pub use request::JsonRpcRequest;
pub use response::{JsonRpcMessage, JsonRpcResponse};
pub use transport::{DisconnectedTransport, FunctionTransport, Transport};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Implementation-defined server error range
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
