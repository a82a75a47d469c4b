use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leaveplan::config::{AppConfig, CONFIG_PATH_ENV};
use leaveplan::server::create_router;
use leaveplan::types::PlannerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leaveplan=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).with_context(|| {
        format!(
            "failed to load configuration from {}",
            config_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string())
        )
    })?;

    let addr: SocketAddr = format!("{}:{}", config.server.address, config.server.port)
        .parse()
        .context("invalid server address")?;
    info!(
        database = %config.database.path,
        ocr = %config.ocr.base_url,
        attendance_mode = ?config.planner.attendance_mode,
        "Starting leaveplan"
    );

    let state = Arc::new(PlannerState::new(config).context("failed to initialize state")?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
