//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Upsert the built-in reference district list on startup
    #[serde(default = "default_true")]
    pub seed_districts: bool,
}

/// Upstream open-data API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Resource URL, e.g. "https://api.data.gov.in/resource/<resource-id>"
    pub base_url: String,
    /// Value sent in the `api-key` header
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_secs: u64,
    /// Total attempts for retrying fetches (default: 3)
    pub max_attempts: u32,
    /// Backoff unit; the delay after attempt n is n times this (default: 1000)
    pub retry_base_delay_ms: u64,
    /// `limit` parameter for the district list lookup (default: 1000)
    pub district_list_limit: u32,
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for district performance payloads (default: 300000 = 5 min)
    pub default_ttl_ms: u64,
    /// TTL for the district list lookup (default: 3600000 = 1 hour)
    pub district_list_ttl_ms: u64,
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn district_list_ttl(&self) -> Duration {
        Duration::from_millis(self.district_list_ttl_ms)
    }
}

/// Sync pipeline configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub policy: NormalizationPolicy,
}

/// How malformed upstream fields are handled during sync
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationPolicy {
    /// Fall back to the field default and log a warning
    #[default]
    Lenient,
    /// Skip the whole record and report it as quarantined
    Strict,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (NREGADASH__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "data/nregadash.db")?
            .set_default("database.seed_districts", true)?
            .set_default("upstream.api_key", "")?
            .set_default("upstream.request_timeout_secs", 10)?
            .set_default("upstream.max_attempts", 3)?
            .set_default("upstream.retry_base_delay_ms", 1000)?
            .set_default("upstream.district_list_limit", 1000)?
            .set_default("cache.default_ttl_ms", 300_000)?
            .set_default("cache.district_list_ttl_ms", 3_600_000)?
            .set_default("sync.policy", "lenient")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("NREGADASH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        let base_url = url::Url::parse(&self.upstream.base_url).map_err(|e| {
            AppError::Config(format!(
                "upstream.base_url is not a valid URL ({}): {}",
                self.upstream.base_url, e
            ))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "upstream.base_url must use http or https, got {}",
                base_url.scheme()
            )));
        }

        if self.upstream.max_attempts == 0 {
            return Err(AppError::Config(
                "upstream.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.upstream.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "upstream.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.cache.default_ttl_ms == 0 || self.cache.district_list_ttl_ms == 0 {
            return Err(AppError::Config(
                "cache TTLs must be greater than 0".to_string(),
            ));
        }

        if self.upstream.api_key.trim().is_empty() {
            tracing::warn!("upstream.api_key is empty; upstream requests will be unauthenticated");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/nregadash-test.db"),
                seed_districts: true,
            },
            upstream: UpstreamConfig {
                base_url: "https://api.data.gov.in/resource/mgnrega".to_string(),
                api_key: "key".to_string(),
                request_timeout_secs: 10,
                max_attempts: 3,
                retry_base_delay_ms: 1000,
                district_list_limit: 1000,
            },
            cache: CacheConfig {
                default_ttl_ms: 300_000,
                district_list_ttl_ms: 3_600_000,
            },
            sync: SyncConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.policy, NormalizationPolicy::Lenient);
        assert_eq!(config.upstream.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.district_list_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn validate_rejects_unparsable_base_url() {
        let mut config = valid_config();
        config.upstream.base_url = "not a url".to_string();

        let error = config.validate().expect_err("invalid base url must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("upstream.base_url")
        ));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let mut config = valid_config();
        config.upstream.base_url = "ftp://example.com/data".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = valid_config();
        config.upstream.max_attempts = 0;

        let error = config.validate().expect_err("zero attempts must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("max_attempts")
        ));
    }

    #[test]
    fn policy_deserializes_from_lowercase() {
        let sync: SyncConfig = serde_json::from_str(r#"{"policy":"strict"}"#).unwrap();
        assert_eq!(sync.policy, NormalizationPolicy::Strict);
    }
}
