//! Common test utilities for E2E tests

pub mod mock_upstream;

use std::sync::Arc;

use nregadash::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub use mock_upstream::{MockResponse, MockUpstream};

/// Options for starting a test server
pub struct TestOptions {
    pub policy: config::NormalizationPolicy,
    /// Overrides the mock upstream URL (e.g. to point at a closed port)
    pub upstream_url: Option<String>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            policy: config::NormalizationPolicy::Lenient,
            upstream_url: None,
        }
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub upstream: Arc<MockUpstream>,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Configuration pointing at a temp database and the given upstream
pub fn test_config(
    db_path: std::path::PathBuf,
    upstream_url: String,
    policy: config::NormalizationPolicy,
) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
        },
        database: config::DatabaseConfig {
            path: db_path,
            seed_districts: true,
        },
        upstream: config::UpstreamConfig {
            base_url: upstream_url,
            api_key: "test-api-key".to_string(),
            request_timeout_secs: 2,
            max_attempts: 3,
            retry_base_delay_ms: 10,
            district_list_limit: 1000,
        },
        cache: config::CacheConfig {
            default_ttl_ms: 300_000,
            district_list_ttl_ms: 3_600_000,
        },
        sync: config::SyncConfig { policy },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a new test server backed by a fresh mock upstream
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_options(options: TestOptions) -> Self {
        let upstream = Arc::new(MockUpstream::start().await);

        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let upstream_url = options
            .upstream_url
            .unwrap_or_else(|| upstream.base_url.clone());
        let config = test_config(db_path, upstream_url, options.policy);

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = nregadash::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            upstream,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST /api/data/sync for a district
    pub async fn sync(&self, district_id: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/data/sync"))
            .json(&serde_json::json!({ "districtId": district_id }))
            .send()
            .await
            .unwrap()
    }

    /// DELETE /api/cache
    pub async fn flush_cache(&self) {
        let response = self
            .client
            .delete(self.url("/api/cache"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}

/// Upstream row in the provider's snake_case shape
pub fn upstream_row(district_id: &str, month: i32, year: i32, households: i64) -> serde_json::Value {
    serde_json::json!({
        "district_id": district_id,
        "month": month.to_string(),
        "year": year.to_string(),
        "total_households": households.to_string(),
        "total_workers": "8000",
        "person_days": "180000",
        "women_participation": "55.4",
        "scst_participation": "24.9",
        "total_funds": "45000000",
        "funds_utilized": "41000000",
    })
}
