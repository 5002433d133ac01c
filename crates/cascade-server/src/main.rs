use anyhow::Context;
use cascade_core::CascadeConfig;
use cascade_router::EchoBackend;
use cascade_server::{app_with_state, state::AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("CASCADE_CONFIG") {
        Ok(path) => CascadeConfig::load(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => CascadeConfig::default(),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, Arc::new(EchoBackend))?;

    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, "cascade server listening");
    axum::serve(listener, app_with_state(state)).await?;
    Ok(())
}
