use std::sync::Arc;

use mcp_http_dispatch::{
    build_app, config::Config, domain::tools::default_registry, logging, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let registry = Arc::new(default_registry()?);
    let bind_socket = config.bind_socket()?;

    info!(tools = registry.len(), "tool registry loaded");

    let state = AppState::new(config.api_token.clone(), registry, config.tool_timeout);
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        tool_timeout_secs = config.tool_timeout.as_secs(),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
