mod clock;
mod config;
mod errors;
mod metrics;
mod model;
mod rest;
mod ring;
mod store;
mod validate;

use anyhow::Context;
use clock::SystemClock;
use config::Config;
use std::sync::Arc;
use store::TelemetryStore;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.validate().context("invalid configuration")?;

    info!("Starting sensor hub");
    info!("HTTP server: {}", config.http_addr);
    info!(
        "Retention: {} temperature / {} generic readings, staleness {}s",
        config.store.temperature_capacity,
        config.store.generic_capacity,
        config.store.staleness.num_seconds()
    );

    metrics::init_metrics().context("failed to register metrics")?;

    let store = Arc::new(TelemetryStore::new(
        config.store.clone(),
        Arc::new(SystemClock),
    ));

    // Build HTTP app with REST API and metrics endpoint
    let app = rest::create_router(store).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.http_addr))?;

    info!("HTTP server listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated")?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
