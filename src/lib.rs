use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;

use domain::registry::ToolRegistry;
use mcp::server::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub api_token: Arc<str>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(api_token: String, registry: Arc<ToolRegistry>, tool_timeout: Duration) -> Self {
        Self {
            api_token: Arc::<str>::from(api_token),
            dispatcher: Arc::new(Dispatcher::new(registry, tool_timeout)),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/mcp", post(http::handlers::mcp_endpoint))
        .route("/mcp/stream", post(http::handlers::mcp_stream_endpoint))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ));

    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .merge(protected)
        .layer(cors_layer())
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

/// Any origin may call any route. Preflights are answered here, before routing and auth.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(http::transport::TRANSPORT_HEADER),
        ])
}
