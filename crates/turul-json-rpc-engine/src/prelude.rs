//! # JSON-RPC Engine Prelude
//!
//! ```rust
//! use turul_json_rpc_engine::prelude::*;
//! ```

pub use crate::config::{EngineConfig, IdConfig, LoggingConfig};
pub use crate::engine::{EngineState, EngineStatistics, JsonRpcEngine, JsonRpcEngineBuilder};
pub use crate::error::{
    EngineError, EngineResult, JsonRpcErrorCode, MethodError, RpcError, TransportError,
};
pub use crate::handler::{JsonRpcMethod, MethodRegistry, MethodResolver, method_fn};
pub use crate::id::{IdGenerator, PrefixedIdGenerator, SequentialIdGenerator};
pub use crate::transport::{FunctionTransport, Transport};
pub use crate::types::RequestId;

// Standard error codes
pub use crate::error_codes::*;
