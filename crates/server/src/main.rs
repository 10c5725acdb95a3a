//! Travel Server - HTTP front end for the travel cost predictor
//!
//! Loads the destination catalog and model artifact once at startup and
//! serves predictions until interrupted.

use anyhow::{Context, Result};
use predictor_lib::{
    health::HealthRegistry,
    observability::{PredictorMetrics, StructuredLogger},
    Session,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use travel_server::{api, config::ServerConfig};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting travel-server");

    let config = ServerConfig::load()?;
    info!(instance = %config.instance, model_path = %config.model_path().display(), "Server configured");

    let session = match Session::load(&config.session_config()) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "Failed to load startup inputs");
            return Err(e).context("Startup aborted");
        }
    };

    let health_registry = HealthRegistry::new();
    api::init_health(&health_registry, &session).await;

    let metrics = PredictorMetrics::new();
    metrics.set_catalog_size(session.catalog().len());
    metrics.set_model_info(session.artifact().kind(), session.artifact().fingerprint());

    let logger = StructuredLogger::new(&config.instance);
    logger.log_startup(
        SERVICE_VERSION,
        session.artifact().kind(),
        session.artifact().fingerprint(),
    );

    let app_state = Arc::new(api::AppState::new(
        session,
        health_registry.clone(),
        metrics,
        logger.clone(),
        config.currency.clone(),
    ));

    health_registry.set_ready(true).await;

    api::serve(&config.bind_addr(), app_state, shutdown_signal()).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
