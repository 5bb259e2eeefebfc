use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::error_codes;
use crate::types::{JsonRpcVersion, RequestId};

/// JSON-RPC error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Application error with a caller-chosen code
    ServerError(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError(_) => "Server error",
        }
    }

    /// Classify a wire code. Reserved protocol codes map to their kind,
    /// everything else is a server error.
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            other => JsonRpcErrorCode::ServerError(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC Error response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    /// Serialized as `null` when the request id could not be determined
    pub id: Option<RequestId>,
    pub error: JsonRpcErrorObject,
}

impl JsonRpcError {
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            error,
        }
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for JsonRpcError {}

/// A protocol or application error: one of the canonical kinds plus a
/// message and optional auxiliary data.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (code {})", .kind.code())]
pub struct RpcError {
    pub kind: JsonRpcErrorCode,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(kind: JsonRpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            kind,
            message: message.unwrap_or_else(|| kind.message().to_string()),
            data,
        }
    }

    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, Some(reason.into()), None)
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, Some(reason.into()), None)
    }

    pub fn method_not_found() -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound, None, None)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, Some(message.into()), None)
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, message, None)
    }

    pub fn server_error(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(
            JsonRpcErrorCode::ServerError(code),
            Some(message.into()),
            data,
        )
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn code(&self) -> i64 {
        self.kind.code()
    }

    /// Rebuild an error from a wire error object received in a response.
    pub fn from_error_object(object: JsonRpcErrorObject) -> Self {
        Self {
            kind: JsonRpcErrorCode::from_code(object.code),
            message: object.message,
            data: object.data,
        }
    }

    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject {
            code: self.code(),
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }

    /// Project into a Response-Error envelope addressed to `id`.
    pub fn as_payload(&self, id: Option<RequestId>) -> JsonRpcError {
        JsonRpcError::new(id, self.to_error_object())
    }
}

impl From<JsonRpcErrorObject> for RpcError {
    fn from(object: JsonRpcErrorObject) -> Self {
        Self::from_error_object(object)
    }
}

/// Failures of the embedder-supplied send function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Transport closed")]
    Closed,
}

/// Error returned by a method implementation.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Structured application error, forwarded to the peer as-is
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Anything else; reported to the peer as an internal error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MethodError {
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(anyhow::Error::new(error))
    }

    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Other(anyhow::Error::msg(message))
    }

    /// The error object a peer sees when this failure answers a request.
    pub fn into_rpc_error(self) -> RpcError {
        match self {
            MethodError::Rpc(error) => error,
            MethodError::Other(error) => RpcError::internal_error(Some(error.to_string())),
        }
    }
}

/// Errors observed by the embedder of the engine
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Protocol error, or an error response received from the peer
    #[error("JSON-RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unstructured failure of a notification handler
    #[error("Method failed: {0}")]
    Method(Arc<anyhow::Error>),

    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// The completion handle was dropped without being settled
    #[error("Call canceled")]
    Canceled,
}

impl EngineError {
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Disconnected(reason.into())
    }

    /// The protocol error, if this is one
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            EngineError::Rpc(error) => Some(error),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<i64> {
        self.as_rpc().map(RpcError::code)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<MethodError> for EngineError {
    fn from(error: MethodError) -> Self {
        match error {
            MethodError::Rpc(error) => Self::Rpc(error),
            MethodError::Other(error) => Self::Method(Arc::new(error)),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
