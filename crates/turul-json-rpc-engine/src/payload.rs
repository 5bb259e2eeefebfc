//! # Payload Model
//!
//! Structural validation and classification of decoded JSON-RPC envelopes.
//!
//! Validation is permissive about unknown fields so newer protocol
//! extensions pass through untouched. Field presence is modelled with
//! `Option`: an `id` of `0` is present, an `id` of `null` is not.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{JsonRpcError, JsonRpcErrorObject, RpcError};
use crate::notification::JsonRpcNotification;
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcResponse;
use crate::types::{JsonRpcVersion, RequestId};

/// Any single JSON-RPC envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcEnvelope {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    Response(JsonRpcResponse),
    Error(JsonRpcError),
}

impl JsonRpcEnvelope {
    /// Parse raw text and classify it for the given direction of traffic.
    pub fn parse(text: &str, is_request: bool) -> Result<Self, RpcError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RpcError::parse_error(format!("Parse error: {}", e)))?;
        Self::from_value(value, is_request)
    }

    /// Validate a decoded value and classify it.
    ///
    /// Request direction yields `Request` or `Notification`; response
    /// direction yields `Response` or `Error`.
    pub fn from_value(value: Value, is_request: bool) -> Result<Self, RpcError> {
        validate(&value, is_request)?;

        let Value::Object(mut object) = value else {
            return Err(RpcError::invalid_request(NOT_AN_OBJECT));
        };
        let id = extract_id(&object)?;

        if is_request {
            let method = match object.remove("method") {
                Some(Value::String(method)) => method,
                _ => return Err(RpcError::invalid_request(BAD_METHOD)),
            };
            let params = match object.remove("params") {
                Some(Value::Array(params)) => params,
                None => Vec::new(),
                Some(_) => return Err(RpcError::invalid_request(BAD_PARAMS)),
            };

            return Ok(match id {
                Some(id) => JsonRpcEnvelope::Request(JsonRpcRequest::new(id, method, params)),
                None => JsonRpcEnvelope::Notification(JsonRpcNotification::new(method, params)),
            });
        }

        match (object.remove("result"), object.remove("error")) {
            (Some(_), Some(_)) => Err(RpcError::invalid_request(BOTH_OUTCOMES)),
            (None, None) => Err(RpcError::invalid_request(NO_OUTCOME)),
            (Some(result), None) => {
                let id = id.ok_or_else(|| {
                    RpcError::invalid_request("result response must carry an id")
                })?;
                Ok(JsonRpcEnvelope::Response(JsonRpcResponse::success(id, result)))
            }
            (None, Some(error)) => {
                let error: JsonRpcErrorObject = serde_json::from_value(error).map_err(|e| {
                    RpcError::invalid_request(format!("malformed error object: {}", e))
                })?;
                Ok(JsonRpcEnvelope::Error(JsonRpcError {
                    version: JsonRpcVersion::V2_0,
                    id,
                    error,
                }))
            }
        }
    }

    /// The correlation identifier, if the envelope carries one
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcEnvelope::Request(request) => Some(&request.id),
            JsonRpcEnvelope::Notification(_) => None,
            JsonRpcEnvelope::Response(response) => Some(&response.id),
            JsonRpcEnvelope::Error(error) => error.id.as_ref(),
        }
    }

    /// The method name for requests and notifications
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcEnvelope::Request(request) => Some(&request.method),
            JsonRpcEnvelope::Notification(notification) => Some(&notification.method),
            _ => None,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(
            self,
            JsonRpcEnvelope::Request(_) | JsonRpcEnvelope::Notification(_)
        )
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, JsonRpcEnvelope::Notification(_))
    }
}

const NOT_AN_OBJECT: &str = "payload must be a JSON object";
const BAD_VERSION: &str = "jsonrpc must be exactly \"2.0\"";
const BAD_ID: &str = "id must be a number, string, or null";
const BAD_METHOD: &str = "method must be a non-empty string";
const BAD_PARAMS: &str = "params must be an array";
const FRACTIONAL_ID: &str = "numeric id must be an integer";
const ID_OUT_OF_RANGE: &str = "numeric id out of range";
const BOTH_OUTCOMES: &str = "response must not carry both result and error";
const NO_OUTCOME: &str = "response must carry either result or error";

/// Check `value` against the envelope shape expected for one direction.
///
/// `is_request` selects request-side rules (`method`, `params`) or
/// response-side rules (exactly one of `result`/`error`, `error` shape).
/// Unknown fields are ignored.
pub fn validate(value: &Value, is_request: bool) -> Result<(), RpcError> {
    let object = value
        .as_object()
        .ok_or_else(|| RpcError::invalid_request(NOT_AN_OBJECT))?;

    match object.get("jsonrpc") {
        Some(Value::String(version)) if version == crate::JSONRPC_VERSION => {}
        _ => return Err(RpcError::invalid_request(BAD_VERSION)),
    }

    if let Some(id) = object.get("id") {
        if !(id.is_number() || id.is_string() || id.is_null()) {
            return Err(RpcError::invalid_request(BAD_ID));
        }
    }

    if is_request {
        match object.get("method") {
            Some(Value::String(method)) if !method.is_empty() => {}
            _ => return Err(RpcError::invalid_request(BAD_METHOD)),
        }
        if let Some(params) = object.get("params") {
            if !params.is_array() {
                return Err(RpcError::invalid_request(BAD_PARAMS));
            }
        }
    } else {
        match (object.contains_key("result"), object.get("error")) {
            (true, Some(_)) => return Err(RpcError::invalid_request(BOTH_OUTCOMES)),
            (false, None) => return Err(RpcError::invalid_request(NO_OUTCOME)),
            _ => {}
        }
        if let Some(error) = object.get("error") {
            let error = error
                .as_object()
                .ok_or_else(|| RpcError::invalid_request("error must be an object"))?;
            if !error.get("code").is_some_and(Value::is_number) {
                return Err(RpcError::invalid_request("error.code must be a number"));
            }
            if !error.get("message").is_some_and(Value::is_string) {
                return Err(RpcError::invalid_request("error.message must be a string"));
            }
        }
    }

    Ok(())
}

/// Best-effort identifier recovery from a payload that may be invalid,
/// used to address the error response.
pub fn request_id_of(value: &Value) -> Option<RequestId> {
    value.get("id").and_then(RequestId::from_value)
}

fn extract_id(object: &Map<String, Value>) -> Result<Option<RequestId>, RpcError> {
    match object.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => RequestId::from_value(value).map(Some).ok_or_else(|| {
            // Integers beyond i64 cannot be echoed back faithfully
            let reason = if value.is_u64() {
                ID_OUT_OF_RANGE
            } else {
                FRACTIONAL_ID
            };
            RpcError::invalid_request(reason)
        }),
    }
}
