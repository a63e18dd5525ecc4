//! JSON-RPC 2.0 envelope types and the error-code table
//!
//! Responses echo the inbound `id` as a raw JSON value so a numeric id never turns
//! into a string (or the other way round).

use serde::Serialize;
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn message_for(code: i32) -> &'static str {
        match code {
            PARSE_ERROR => "Parse error",
            INVALID_REQUEST => "Invalid Request",
            METHOD_NOT_FOUND => "Method not found",
            INVALID_PARAMS => "Invalid params",
            _ => "Internal error",
        }
    }
}

/// A request that passed envelope validation.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    /// `None` when the field was absent from the body.
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// The id to echo back; an absent id is rendered as `null`.
    pub fn response_id(&self) -> Value {
        self.id.clone().unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(JsonRpcError),
}

/// Exactly one of `result` or `error`, enforced by [`ResponsePayload`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: ResponsePayload::Error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_id_stays_numeric() {
        let response = JsonRpcResponse::result(json!(42), json!({}));
        let value = serde_json::to_value(response).expect("serialize response");
        assert_eq!(value["id"], json!(42));
        assert!(value["id"].is_number());
    }

    #[test]
    fn string_id_stays_string() {
        let response = JsonRpcResponse::result(json!("42"), json!({}));
        let value = serde_json::to_value(response).expect("serialize response");
        assert_eq!(value["id"], json!("42"));
    }

    #[test]
    fn absent_id_renders_null() {
        let request = JsonRpcRequest {
            id: None,
            method: "tools/list".into(),
            params: None,
        };
        assert_eq!(request.response_id(), Value::Null);

        let value = serde_json::to_value(JsonRpcResponse::result(request.response_id(), json!({})))
            .expect("serialize response");
        assert!(value.get("id").is_some_and(Value::is_null));
    }

    #[test]
    fn error_response_has_no_result() {
        let response = JsonRpcResponse::error(
            json!(1),
            JsonRpcError {
                code: error_codes::METHOD_NOT_FOUND,
                message: "Method not found".into(),
                data: None,
            },
        );
        let value = serde_json::to_value(&response).expect("serialize response");

        assert!(matches!(response.payload, ResponsePayload::Error(_)));
        assert!(value.get("result").is_none());
        assert_eq!(value["error"]["code"], -32601);
        assert!(value["error"].get("data").is_none());
        assert_eq!(value["jsonrpc"], "2.0");
    }
}
