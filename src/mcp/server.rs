//! The central Model Context Protocol engine
//!
//! Routes a validated JSON-RPC request to one of the built-in methods, resolves
//! `tools/call` against the [`ToolRegistry`] and turns every failure into an
//! [`RpcFailure`] so each request ends with exactly one outcome.

use std::{sync::Arc, time::Duration};

use rust_mcp_sdk::schema::ListToolsResult;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::domain::registry::ToolRegistry;
use crate::errors::RpcFailure;
use crate::mcp::rpc::{JsonRpcRequest, JsonRpcResponse};
use crate::mcp::validator::parse_body;

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The fixed method set understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    ToolsList,
    RootsList,
    ToolsCall,
    Notify,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(Self::Initialize),
            "tools/list" => Some(Self::ToolsList),
            "roots/list" => Some(Self::RootsList),
            "tools/call" => Some(Self::ToolsCall),
            "notifications/notify" => Some(Self::Notify),
            _ => None,
        }
    }
}

/// Terminal outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reply(JsonRpcResponse),
    Failed { id: Value, failure: RpcFailure },
    /// Notification handled; nothing is sent back.
    NoResponse,
}

impl Outcome {
    pub fn failed(id: Value, failure: RpcFailure) -> Self {
        Self::Failed { id, failure }
    }

    /// The JSON-RPC message to send, if any.
    pub fn message(&self) -> Option<JsonRpcResponse> {
        match self {
            Self::Reply(response) => Some(response.clone()),
            Self::Failed { id, failure } => Some(JsonRpcResponse::error(
                id.clone(),
                failure.to_json_rpc_error(),
            )),
            Self::NoResponse => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Reply(_) => "success",
            Self::Failed { .. } => "failure",
            Self::NoResponse => "no_response",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeDescriptor {
    protocol_version: &'static str,
    capabilities: Value,
    server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
struct ServerInfo {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct RootsResult {
    roots: Vec<Root>,
}

#[derive(Debug, Serialize)]
struct Root {
    name: &'static str,
    uri: &'static str,
    description: &'static str,
}

pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    tool_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, tool_timeout: Duration) -> Self {
        Self {
            registry,
            tool_timeout,
        }
    }

    pub async fn dispatch(&self, request: JsonRpcRequest) -> Outcome {
        let audit_params = redact_audit_params(request.params.as_ref());
        let id = request.response_id();

        let outcome = match Method::parse(&request.method) {
            Some(method) => match self.handle(method, &request).await {
                Ok(Some(result)) => Outcome::Reply(JsonRpcResponse::result(id, result)),
                Ok(None) => Outcome::NoResponse,
                Err(failure) => Outcome::failed(id, failure),
            },
            None => Outcome::failed(
                id,
                RpcFailure::MethodNotFound(format!("Method '{}' not found", request.method)),
            ),
        };

        info!(
            method = %request.method,
            params = %audit_params,
            outcome = outcome.label(),
            "mcp action audited"
        );

        outcome
    }

    async fn handle(
        &self,
        method: Method,
        request: &JsonRpcRequest,
    ) -> Result<Option<Value>, RpcFailure> {
        match method {
            Method::Initialize => to_result(&InitializeDescriptor {
                protocol_version: SUPPORTED_PROTOCOL_VERSION,
                capabilities: json!({
                    "tools": {},
                    "sampling": {},
                    "roots": {
                        "listChanged": true
                    }
                }),
                server_info: ServerInfo {
                    name: SERVER_NAME,
                    version: SERVER_VERSION,
                },
            })
            .map(Some),
            Method::ToolsList => to_result(&ListToolsResult {
                meta: None,
                next_cursor: None,
                tools: self.registry.list(),
            })
            .map(Some),
            Method::RootsList => to_result(&RootsResult {
                roots: vec![Root {
                    name: "default",
                    uri: "file:///",
                    description: "Default file system root",
                }],
            })
            .map(Some),
            Method::ToolsCall => self.call_tool(request.params.as_ref()).await.map(Some),
            Method::Notify => Ok(None),
        }
    }

    async fn call_tool(&self, params: Option<&Value>) -> Result<Value, RpcFailure> {
        let (name, arguments) = parse_tool_call(params)?;

        let handler = self
            .registry
            .get(&name)
            .ok_or_else(|| RpcFailure::ToolNotFound(format!("Tool '{name}' not found")))?;

        let mut task = tokio::spawn(async move { handler.call(arguments).await });
        let joined = match tokio::time::timeout(self.tool_timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_elapsed) => {
                task.abort();
                error!(
                    tool = %name,
                    timeout_ms = self.tool_timeout.as_millis(),
                    "tool invocation timed out"
                );
                return Err(RpcFailure::Internal(format!(
                    "Tool '{name}' timed out after {}ms",
                    self.tool_timeout.as_millis()
                )));
            }
        };

        match joined {
            Ok(Ok(result)) => to_result(&result),
            Ok(Err(err)) => {
                warn!(tool = %name, error = %err, "tool invocation failed");
                Err(RpcFailure::InvalidParams(err.to_string()))
            }
            Err(join_err) => {
                error!(tool = %name, error = %join_err, "tool task did not complete");
                Err(RpcFailure::Internal(format!("Tool '{name}' panicked")))
            }
        }
    }
}

/// Validates a raw request body and dispatches it.
///
/// Dispatch runs on its own task so that a panic anywhere below this point still
/// produces an `Internal error` response instead of dropping the request.
pub async fn handle_json_rpc_body(dispatcher: Arc<Dispatcher>, body: &[u8]) -> Outcome {
    let request = match parse_body(body) {
        Ok(request) => request,
        Err(rejection) => {
            warn!(error = %rejection.failure, "rejected json-rpc envelope");
            return Outcome::failed(rejection.id, rejection.failure);
        }
    };

    let id = request.response_id();
    match tokio::spawn(async move { dispatcher.dispatch(request).await }).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "dispatch task did not complete");
            Outcome::failed(id, RpcFailure::Internal("Unexpected dispatcher failure".to_string()))
        }
    }
}

/// Extracts `params.name` and `params.arguments` (defaulting to an empty object).
pub fn parse_tool_call(params: Option<&Value>) -> Result<(String, Map<String, Value>), RpcFailure> {
    let params = match params {
        Some(Value::Object(params)) => params,
        _ => {
            return Err(RpcFailure::InvalidParams(
                "params must be an object".to_string(),
            ))
        }
    };

    let name = params
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            RpcFailure::InvalidParams("params.name must be a non-empty string".to_string())
        })?;

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(arguments)) => arguments.clone(),
        Some(_) => {
            return Err(RpcFailure::InvalidParams(
                "params.arguments must be an object".to_string(),
            ))
        }
    };

    Ok((name.to_string(), arguments))
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, RpcFailure> {
    serde_json::to_value(value)
        .map_err(|err| RpcFailure::Internal(format!("failed to serialize result: {err}")))
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "authorization" | "bearer" | "credentials" | "api_key" | "apikey"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}
