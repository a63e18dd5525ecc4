use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::rpc::{error_codes, JsonRpcError};

const WWW_AUTHENTICATE: &str =
    "Bearer error=\"unauthorized\", error_description=\"Authorization needed\"";

/// HTTP-level failures that happen outside the JSON-RPC envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {message}")]
    Unauthorized {
        code: &'static str,
        message: &'static str,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn unauthorized(code: &'static str, message: &'static str) -> Self {
        Self::Unauthorized { code, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized { code, message } => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, HeaderValue::from_static(WWW_AUTHENTICATE))],
                Json(ErrorResponse {
                    code: code.to_string(),
                    message: message.to_string(),
                    details: json!({}),
                }),
            )
                .into_response(),
        }
    }
}

/// A JSON-RPC failure together with the stage that produced it.
///
/// The stage matters for the buffered transport: envelope and routing failures
/// change the HTTP status, while failures reported from inside a method handler
/// travel with `200 OK` like any other handler result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcFailure {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("tool not found: {0}")]
    ToolNotFound(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcFailure {
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => error_codes::PARSE_ERROR,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::MethodNotFound(_) | Self::ToolNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => error_codes::INVALID_PARAMS,
            Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        error_codes::message_for(self.code())
    }

    pub fn data(&self) -> &str {
        match self {
            Self::Parse(data)
            | Self::InvalidRequest(data)
            | Self::MethodNotFound(data)
            | Self::ToolNotFound(data)
            | Self::InvalidParams(data)
            | Self::Internal(data) => data,
        }
    }

    /// Status used by the buffered transport. The stream transport always answers `200`.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Parse(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotFound(_) => StatusCode::NOT_FOUND,
            Self::ToolNotFound(_) | Self::InvalidParams(_) => StatusCode::OK,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self) -> JsonRpcError {
        JsonRpcError {
            code: self.code(),
            message: self.message().to_string(),
            data: Some(Value::String(self.data().to_string())),
        }
    }
}
