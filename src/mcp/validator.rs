//! JSON-RPC envelope validation
//!
//! Rules are checked in a fixed order and only the first violation is reported.

use serde_json::Value;

use crate::errors::RpcFailure;
use crate::mcp::rpc::{JsonRpcRequest, JSONRPC_VERSION};

/// A rejected envelope. `id` is whatever could be read before the failing rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub id: Value,
    pub failure: RpcFailure,
}

pub fn parse_body(body: &[u8]) -> Result<JsonRpcRequest, Rejection> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| Rejection {
        id: Value::Null,
        failure: RpcFailure::Parse("Invalid JSON".to_string()),
    })?;

    validate_request(payload)
}

pub fn validate_request(payload: Value) -> Result<JsonRpcRequest, Rejection> {
    let Value::Object(mut envelope) = payload else {
        return Err(Rejection {
            id: Value::Null,
            failure: RpcFailure::Parse("Invalid JSON".to_string()),
        });
    };

    let id = envelope.remove("id");
    let reject = |failure| Rejection {
        id: id.clone().unwrap_or(Value::Null),
        failure,
    };

    if envelope.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(reject(RpcFailure::InvalidRequest(
            "Missing or invalid jsonrpc field".to_string(),
        )));
    }

    let method = match envelope.remove("method") {
        Some(Value::String(method)) if !method.is_empty() => method,
        _ => {
            return Err(reject(RpcFailure::InvalidRequest(
                "Missing or invalid method field".to_string(),
            )))
        }
    };

    Ok(JsonRpcRequest {
        id,
        method,
        params: envelope.remove("params"),
    })
}
