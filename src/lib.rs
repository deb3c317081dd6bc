//! nregadash - district performance dashboard backend
//!
//! Serves rural employment scheme performance metrics per district. Data is
//! pulled from the government open-data API, normalized, and upserted into
//! SQLite; the dashboard reads it back through the query endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Sync trigger / district query endpoints                  │
//! │  - Metrics                                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Sync pipeline (normalize + transactional upsert)         │
//! │  - Performance queries                                      │
//! └─────────────────────────────────────────────────────────────┘
//!              │                                │
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │      Upstream Client      │   │         Data Layer           │
//! │  - TTL response cache     │   │  - SQLite (sqlx)             │
//! │  - Retry with backoff     │   │  - Reference districts       │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Sync pipeline and queries
//! - `upstream`: Open-data API client, ingestion schema
//! - `data`: Database and cache layer
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod upstream;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request; everything behind it is shared.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Upstream response cache (volatile)
    pub cache: Arc<data::ResponseCache>,

    /// Upstream data API client
    pub upstream: Arc<upstream::DataGovClient>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database
    /// 2. Seed reference districts (if enabled)
    /// 3. Initialize response cache
    /// 4. Build upstream client
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path).await?;

        if config.database.seed_districts {
            let seeded = db.seed_districts(data::REFERENCE_DISTRICTS).await?;
            tracing::info!(districts = seeded, "Reference districts seeded");
        }

        let cache = Arc::new(data::ResponseCache::new(
            "upstream",
            config.cache.default_ttl(),
        ));

        let upstream = upstream::DataGovClient::new(&config.upstream, &config.cache, cache.clone())?;
        tracing::info!(base_url = %config.upstream.base_url, "Upstream client initialized");

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            cache,
            upstream: Arc::new(upstream),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::data_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
