use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::http::transport::TransportMode;

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// One summary line per request, tagged with the transport the MCP handlers chose.
///
/// Streamed responses are summarized when the headers go out, so their duration
/// covers the time to the first frame only.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let transport = served_transport(&response);
    let elapsed_ms = started_at.elapsed().as_millis();

    info!(
        method = %method,
        path = %path,
        transport,
        status = status.as_u16(),
        duration_ms = elapsed_ms,
        "request summary"
    );

    if status.as_u16() == 401 {
        warn!(method = %method, path = %path, "authentication failure");
    } else if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            transport,
            status = status.as_u16(),
            "request failed"
        );
    }

    response
}

/// `"none"` when no MCP handler produced the response, e.g. preflights and 401s.
fn served_transport(response: &Response) -> &'static str {
    response
        .extensions()
        .get::<TransportMode>()
        .map_or("none", |mode| mode.as_str())
}
