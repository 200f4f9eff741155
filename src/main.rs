//! Sensordash - a live environmental sensor dashboard.
//!
//! Runs the refresh loop and serves the dashboard over HTTP.
//!
//! # API Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /dashboard` - Latest rendered dashboard
//! - `GET /series` - Chart series
//! - `POST /refresh` - Manual refresh

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sensordash::api::{AppState, build_router};
use sensordash::chain::FallbackChain;
use sensordash::config::DashboardConfig;
use sensordash::dashboard::{DashboardController, SnapshotRenderer};
use sensordash::data_sources::build_http_client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("sensordash=info".parse()?))
        .init();

    let config = DashboardConfig::load()?;

    info!(
        port = config.server.port,
        refresh_interval_ms = config.refresh_interval_ms,
        max_series_points = config.max_series_points,
        "Starting sensordash"
    );

    let client = build_http_client(config.request_timeout())?;
    let chain = FallbackChain::from_config(&config, client);
    info!(order = ?chain.order(), "Fallback chain configured");

    let snapshot = SnapshotRenderer::new();
    let controller = Arc::new(DashboardController::new(
        chain,
        Arc::new(snapshot.clone()),
        &config,
    ));
    controller.start().await;

    let app = build_router(AppState {
        controller: Arc::clone(&controller),
        snapshot,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Sensordash is listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    controller.shutdown().await;
    info!("Sensordash stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
