//! Response framing for both transports
//!
//! Buffered responses carry one JSON body. Streamed responses are a fixed two-frame
//! exchange: the connection-established frame goes out before the request is even
//! validated, then the terminal JSON-RPC message (if any) follows and the body ends.

use std::{convert::Infallible, future::Future};

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::http::transport::TransportMode;
use crate::mcp::rpc::JsonRpcResponse;
use crate::mcp::server::Outcome;

pub const CONNECTION_ESTABLISHED_FRAME: &str = "data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/notify\",\"params\":{\"method\":\"connection/established\"}}\n\n";

const INTERNAL_ERROR_FRAME: &str = "data: {\"jsonrpc\":\"2.0\",\"id\":null,\"error\":{\"code\":-32603,\"message\":\"Internal error\"}}\n\n";

pub async fn emit<F>(mode: TransportMode, outcome: F) -> Response
where
    F: Future<Output = Outcome> + Send + 'static,
{
    match mode {
        TransportMode::Buffered => buffered(outcome.await),
        TransportMode::Stream => stream(outcome),
    }
}

pub fn buffered(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Reply(response) => (StatusCode::OK, Json(response)).into_response(),
        Outcome::Failed { id, failure } => {
            let status = failure.status();
            (
                status,
                Json(JsonRpcResponse::error(id, failure.to_json_rpc_error())),
            )
                .into_response()
        }
        Outcome::NoResponse => StatusCode::OK.into_response(),
    }
}

pub fn stream<F>(outcome: F) -> Response
where
    F: Future<Output = Outcome> + Send + 'static,
{
    let frames = async_stream::stream! {
        yield Ok::<Bytes, Infallible>(Bytes::from_static(CONNECTION_ESTABLISHED_FRAME.as_bytes()));

        if let Some(message) = outcome.await.message() {
            yield Ok(frame(&message));
        }
    };

    let mut response = Response::new(Body::from_stream(frames));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    apply_cors_headers(headers);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
}

/// Wraps one JSON-RPC message as a `data: <json>\n\n` frame.
pub fn frame(message: &JsonRpcResponse) -> Bytes {
    match serde_json::to_string(message) {
        Ok(json) => Bytes::from(format!("data: {json}\n\n")),
        Err(err) => {
            error!(error = %err, "failed to serialize stream frame");
            Bytes::from_static(INTERNAL_ERROR_FRAME.as_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    use super::*;
    use crate::errors::RpcFailure;

    async fn body_string(response: Response) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[test]
    fn frame_wraps_json_payload() {
        let bytes = frame(&JsonRpcResponse::result(json!(1), json!({})));
        assert_eq!(
            bytes,
            Bytes::from_static(b"data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n\n")
        );
    }

    #[test]
    fn established_frame_is_valid_json() {
        let payload = CONNECTION_ESTABLISHED_FRAME
            .strip_prefix("data: ")
            .and_then(|rest| rest.strip_suffix("\n\n"))
            .expect("framed payload");
        let value: Value = serde_json::from_str(payload).expect("valid json");
        assert_eq!(value["params"]["method"], "connection/established");
    }

    #[test]
    fn buffered_failure_uses_stage_status() {
        let cases = [
            (RpcFailure::Parse("Invalid JSON".into()), StatusCode::BAD_REQUEST),
            (RpcFailure::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (RpcFailure::MethodNotFound("x".into()), StatusCode::NOT_FOUND),
            (RpcFailure::ToolNotFound("x".into()), StatusCode::OK),
            (RpcFailure::InvalidParams("x".into()), StatusCode::OK),
            (RpcFailure::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (failure, status) in cases {
            let response = buffered(Outcome::failed(Value::Null, failure));
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn buffered_no_response_is_empty_ok() {
        let response = buffered(Outcome::NoResponse);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn stream_emits_established_then_terminal_frame() {
        let response = stream(async {
            Outcome::Reply(JsonRpcResponse::result(json!("abc"), json!({"ok": true})))
        });

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/plain"))
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-cache"))
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );

        let body = body_string(response).await;
        let frames: Vec<&str> = body.split_terminator("\n\n").collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(format!("{}\n\n", frames[0]), CONNECTION_ESTABLISHED_FRAME);
        assert_eq!(
            frames[1],
            "data: {\"jsonrpc\":\"2.0\",\"id\":\"abc\",\"result\":{\"ok\":true}}"
        );
    }

    #[tokio::test]
    async fn stream_failure_is_still_ok_status() {
        let response = stream(async {
            Outcome::failed(json!(9), RpcFailure::MethodNotFound("Method 'x' not found".into()))
        });
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.starts_with(CONNECTION_ESTABLISHED_FRAME));
        assert!(body.contains("\"code\":-32601"));
    }

    #[tokio::test]
    async fn stream_notification_only_has_established_frame() {
        let response = stream(async { Outcome::NoResponse });
        assert_eq!(body_string(response).await, CONNECTION_ESTABLISHED_FRAME);
    }
}
