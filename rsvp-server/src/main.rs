//! rsvp-server: wedding invitation RSVP backend

use std::net::SocketAddr;
use std::time::Duration;

use rsvp_server::{AppState, Config, ServiceResult, api, logger};

/// How often stale rate-limit entries are dropped
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> ServiceResult<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    logger::init_logger();

    let config = Config::from_env();
    tracing::info!(
        "Starting rsvp-server (env: {}, guests sheet: {})",
        config.environment,
        config.sheets.guests_sheet_name
    );
    config.report_problems();

    let state = AppState::from_config(&config)?;

    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("rsvp-server listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("rsvp-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
