mod api;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rfpcat_core::Config;

use crate::state::AppState;

fn load_config() -> Config {
    rfpcat_core::config::load_dotenv();
    Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    config.log_summary();

    let addr = config.server.bind_addr();
    let port = config.server.port;
    let state = Arc::new(AppState::from_config(config).context("failed to build application state")?);
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://localhost:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
