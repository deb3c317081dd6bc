//! nregadash binary entry point

use nregadash::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Initialize tracing/logging
/// 2. Initialize metrics
/// 3. Load configuration from file and environment
/// 4. Initialize AppState
/// 5. Build Axum router and start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_format =
        std::env::var("NREGADASH__LOGGING__FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let log_level =
        std::env::var("NREGADASH__LOGGING__LEVEL").unwrap_or_else(|_| "info".to_string());
    let default_filter = format!("nregadash={log_level},tower_http=debug");

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.clone().into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.clone().into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!("Starting nregadash...");

    nregadash::metrics::init_metrics();

    let config = config::AppConfig::load()?;
    tracing::info!(
        database = %config.database.path.display(),
        upstream = %config.upstream.base_url,
        policy = ?config.sync.policy,
        "Configuration loaded"
    );

    let state = AppState::new(config.clone()).await?;
    let app = nregadash::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
