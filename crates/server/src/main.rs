//! wayback-proxy server entry point.
//!
//! Serves archived snapshots of retro websites to vintage browsers, either as
//! an HTTP proxy or under virtual hosts.

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wayback_core::AppConfig;

mod error;
mod handlers;
mod notifier;
mod proxy;
mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = AppConfig::load()?;
    let state = state::AppState::from_config(&config).await?;

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Starting wayback-proxy");

    axum::serve(listener, routes::create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
