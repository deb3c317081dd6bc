//! Client for the upstream open-data performance API.
//!
//! Every fetch goes through the shared [`ResponseCache`] first; only misses
//! reach the network. Retrying wraps the cache-aware fetch, so an attempt
//! following another caller's successful fetch of the same key is served
//! from the cache.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, header};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use super::RetryPolicy;
use crate::config::{CacheConfig, UpstreamConfig};
use crate::data::ResponseCache;
use crate::error::AppError;
use crate::metrics::{UPSTREAM_REQUEST_DURATION_SECONDS, UPSTREAM_REQUESTS_TOTAL};

const USER_AGENT: &str = concat!("nregadash/", env!("CARGO_PKG_VERSION"));

/// Cache key of the district list lookup
pub const ALL_DISTRICTS_CACHE_KEY: &str = "all-districts";

/// Cache key for a district's performance payload
pub fn district_cache_key(district_id: &str, year: Option<i32>) -> String {
    match year {
        Some(year) => format!("district-{district_id}-{year}"),
        None => format!("district-{district_id}-all"),
    }
}

/// Outcome of one district in a multi-district fetch
///
/// Serializes as `{ districtId, data, error }` with exactly one of `data`
/// and `error` non-null.
#[derive(Debug)]
pub struct DistrictFetch {
    pub district_id: String,
    pub result: Result<Value, String>,
}

impl DistrictFetch {
    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }
}

impl Serialize for DistrictFetch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("DistrictFetch", 3)?;
        state.serialize_field("districtId", &self.district_id)?;
        state.serialize_field("data", &self.result.as_ref().ok())?;
        state.serialize_field("error", &self.error())?;
        state.end()
    }
}

/// Upstream data API client
pub struct DataGovClient {
    http: Client,
    base_url: String,
    cache: Arc<ResponseCache>,
    retry: RetryPolicy,
    district_list_ttl: Duration,
    district_list_limit: u32,
}

impl DataGovClient {
    /// Create new client
    ///
    /// # Arguments
    /// * `upstream` - Base URL, API key, timeout and retry settings
    /// * `cache_config` - TTL for the district list lookup
    /// * `cache` - Shared response cache
    pub fn new(
        upstream: &UpstreamConfig,
        cache_config: &CacheConfig,
        cache: Arc<ResponseCache>,
    ) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let api_key = header::HeaderValue::from_str(&upstream.api_key)
            .map_err(|e| AppError::Config(format!("upstream.api_key is not a valid header: {e}")))?;
        headers.insert("api-key", api_key);

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(upstream.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            http,
            base_url: upstream.base_url.clone(),
            cache,
            retry: RetryPolicy::new(upstream.max_attempts, upstream.retry_base_delay()),
            district_list_ttl: cache_config.district_list_ttl(),
            district_list_limit: upstream.district_list_limit,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Fetch a district's performance payload
    ///
    /// Served from cache when a live entry exists for
    /// `district-<id>-<year|all>`; otherwise one GET is issued and the raw
    /// body cached with the default TTL.
    pub async fn fetch_district_performance(
        &self,
        district_id: &str,
        year: Option<i32>,
    ) -> Result<Value, AppError> {
        let cache_key = district_cache_key(district_id, year);

        let mut query: Vec<(&str, String)> = vec![
            ("filters[district]", district_id.to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(year) = year {
            query.push(("filters[year]", year.to_string()));
        }

        self.fetch_with_cache(&cache_key, &query, self.cache.default_ttl())
            .await
    }

    /// Fetch a district's performance payload, retrying failures
    ///
    /// Uses the client's [`RetryPolicy`]; the final attempt's error is
    /// returned when all attempts fail.
    pub async fn fetch_district_performance_with_retry(
        &self,
        district_id: &str,
        year: Option<i32>,
    ) -> Result<Value, AppError> {
        self.fetch_district_performance_with_policy(district_id, year, self.retry)
            .await
    }

    /// Same as [`Self::fetch_district_performance_with_retry`] with an explicit policy
    pub async fn fetch_district_performance_with_policy(
        &self,
        district_id: &str,
        year: Option<i32>,
        policy: RetryPolicy,
    ) -> Result<Value, AppError> {
        let label = district_cache_key(district_id, year);
        policy
            .run(&label, move |_| self.fetch_district_performance(district_id, year))
            .await
    }

    /// Fetch several districts concurrently
    ///
    /// Failures are isolated per district: every input id gets its own
    /// outcome, in input order.
    pub async fn fetch_multiple_districts(
        &self,
        district_ids: &[String],
        year: Option<i32>,
    ) -> Vec<DistrictFetch> {
        let fetches = district_ids
            .iter()
            .map(|district_id| async move {
                let result = self
                    .fetch_district_performance(district_id, year)
                    .await
                    .map_err(|e| e.to_string());
                DistrictFetch {
                    district_id: district_id.clone(),
                    result,
                }
            });

        let results = futures::future::join_all(fetches).await;

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        tracing::info!(
            requested = district_ids.len(),
            failed,
            "Multi-district fetch complete"
        );

        results
    }

    /// Fetch the upstream district list (cached for the long TTL)
    pub async fn fetch_all_districts(&self) -> Result<Value, AppError> {
        let query = [
            ("fields", "district".to_string()),
            ("format", "json".to_string()),
            ("limit", self.district_list_limit.to_string()),
        ];

        self.fetch_with_cache(ALL_DISTRICTS_CACHE_KEY, &query, self.district_list_ttl)
            .await
    }

    async fn fetch_with_cache(
        &self,
        cache_key: &str,
        query: &[(&str, String)],
        ttl: Duration,
    ) -> Result<Value, AppError> {
        if let Some(cached) = self.cache.get(cache_key).await {
            return Ok(cached);
        }

        let started = Instant::now();
        let result = self.get_json(query).await;
        UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&[if cache_key == ALL_DISTRICTS_CACHE_KEY {
                "districts"
            } else {
                "performance"
            }])
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(body) => {
                UPSTREAM_REQUESTS_TOTAL.with_label_values(&["success"]).inc();
                self.cache.set(cache_key, body.clone(), ttl).await;
                Ok(body)
            }
            Err(error) => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[error.error_type()])
                    .inc();
                tracing::error!(cache_key, %error, "API fetch error");
                Err(error)
            }
        }
    }

    async fn get_json(&self, query: &[(&str, String)]) -> Result<Value, AppError> {
        tracing::debug!(url = %self.base_url, ?query, "Requesting upstream data");

        let response = self
            .http
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream_status(status));
        }

        // The timeout also covers reading the body.
        let body = response
            .json::<Value>()
            .await
            .map_err(classify_transport_error)?;
        Ok(body)
    }
}

/// Map a transport failure: no (complete) response vs. anything else
fn classify_transport_error(error: reqwest::Error) -> AppError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        AppError::UpstreamUnavailable
    } else {
        AppError::HttpClient(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cache_key_uses_all_without_year() {
        assert_eq!(district_cache_key("pune", None), "district-pune-all");
        assert_eq!(district_cache_key("pune", Some(2024)), "district-pune-2024");
    }

    #[test]
    fn district_fetch_serializes_flat_outcome() {
        let ok = DistrictFetch {
            district_id: "pune".into(),
            result: Ok(json!({ "records": [] })),
        };
        let failed = DistrictFetch {
            district_id: "mumbai".into(),
            result: Err("API error: 500 - Internal Server Error".into()),
        };

        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "districtId": "pune", "data": { "records": [] }, "error": null })
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({
                "districtId": "mumbai",
                "data": null,
                "error": "API error: 500 - Internal Server Error"
            })
        );
        assert_eq!(failed.error(), Some("API error: 500 - Internal Server Error"));
    }
}
