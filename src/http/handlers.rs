//! Axum HTTP handlers for the web server
//!
//! Provides the two Model Context Protocol entry points and general metadata endpoints.
//! Both entry points resolve a [`TransportMode`] up front and hand it to the emitter;
//! nothing below this layer looks at request metadata.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::http::emitter::emit;
use crate::http::transport::{classify, TransportMode};
use crate::mcp::server::{handle_json_rpc_body, SERVER_NAME, SERVER_VERSION};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub server: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
    pub mcp_stream_endpoint: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        server: SERVER_NAME,
        version: SERVER_VERSION,
    })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: SERVER_NAME,
        version: SERVER_VERSION,
        mcp_endpoint: "/mcp",
        mcp_stream_endpoint: "/mcp/stream",
    })
}

/// `POST /mcp`: buffered unless the caller asks for `streamable-http`.
pub async fn mcp_endpoint(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mode = classify(&query, &headers);
    serve(state, mode, body).await
}

/// `POST /mcp/stream`: always streamed.
pub async fn mcp_stream_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    serve(state, TransportMode::Stream, body).await
}

async fn serve(state: AppState, mode: TransportMode, body: Bytes) -> Response {
    debug!(transport = mode.as_str(), bytes = body.len(), "mcp request received");

    let mut response = emit(mode, async move {
        handle_json_rpc_body(state.dispatcher, &body).await
    })
    .await;
    response.extensions_mut().insert(mode);
    response
}
