//! HTTP serving surface

mod api;
mod handlers;
mod state;

pub use api::create_router;
pub use state::AppState;

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Serve until ctrl+c
pub async fn run_server(config: &ServerConfig, state: Arc<AppState>) -> Result<()> {
    let start_time = chrono::Utc::now();
    let ready = state.serving.is_ready();
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    if ready {
        info!(address = %addr, pid = std::process::id(), "Server listening");
    } else {
        warn!(address = %addr, "Server listening without a model, /predict will return 503");
    }

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
