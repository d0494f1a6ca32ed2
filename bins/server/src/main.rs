//! PLUS GROUP API Server
//!
//! Main entry point for the billing backend service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plus_api::{AppState, create_router};
use plus_db::connect;
use plus_shared::{AppConfig, BusinessClock, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plus=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Also reads .env
    let config = AppConfig::load().context("failed to load configuration")?;

    let clock = BusinessClock::new(&config.business.timezone)?;
    info!(timezone = %config.business.timezone, "business clock configured");

    let db = connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "connected to database"
    );

    let state = AppState::new(
        db,
        JwtService::new(config.jwt.clone()),
        clock,
        config.business.low_stock_threshold,
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
