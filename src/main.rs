// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::sync_context::SyncContext;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_backend::HttpBackend;
use crate::presentation::app_state::AppState;
use crate::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Backend adapter serves both snapshots and the live stream
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    tracing::info!("Using backend at {}", config.backend.base_url);

    // Start the synchronization core
    let context = Arc::new(SyncContext::start(
        config.sync.clone(),
        config.status.clone(),
        backend.clone(),
        backend,
    )?);

    let state = Arc::new(AppState {
        context: context.clone(),
    });
    let app = router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Serving dashboard views on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    context.shutdown();
    context.join().await;

    Ok(())
}
