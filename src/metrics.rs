//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Cache Metrics
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("nregadash_cache_hits_total", "Total number of cache hits"),
        &["cache_name"]
    ).expect("metric can be created");
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("nregadash_cache_misses_total", "Total number of cache misses"),
        &["cache_name"]
    ).expect("metric can be created");
    pub static ref CACHE_SIZE: IntGaugeVec = IntGaugeVec::new(
        Opts::new("nregadash_cache_size", "Current number of items in cache"),
        &["cache_name"]
    ).expect("metric can be created");

    // Upstream Metrics
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("nregadash_upstream_requests_total", "Total number of upstream data API requests"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "nregadash_upstream_request_duration_seconds",
            "Upstream data API request duration in seconds"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["endpoint"]
    ).expect("metric can be created");
    pub static ref UPSTREAM_RETRIES_TOTAL: IntCounter = IntCounter::new(
        "nregadash_upstream_retries_total",
        "Total number of retried upstream fetches"
    ).expect("metric can be created");

    // Sync Metrics
    pub static ref SYNC_RUNS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("nregadash_sync_runs_total", "Total number of district sync runs"),
        &["status"]
    ).expect("metric can be created");
    pub static ref SYNC_RECORDS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("nregadash_sync_records_total", "Total number of records processed by sync"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref SYNC_COERCED_FIELDS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("nregadash_sync_coerced_fields_total", "Malformed upstream fields replaced by their default"),
        &["field"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("nregadash_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(CACHE_HITS_TOTAL.clone()))
        .expect("CACHE_HITS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(CACHE_MISSES_TOTAL.clone()))
        .expect("CACHE_MISSES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(CACHE_SIZE.clone()))
        .expect("CACHE_SIZE can be registered");
    REGISTRY
        .register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))
        .expect("UPSTREAM_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()))
        .expect("UPSTREAM_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(UPSTREAM_RETRIES_TOTAL.clone()))
        .expect("UPSTREAM_RETRIES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SYNC_RUNS_TOTAL.clone()))
        .expect("SYNC_RUNS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SYNC_RECORDS_TOTAL.clone()))
        .expect("SYNC_RECORDS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SYNC_COERCED_FIELDS_TOTAL.clone()))
        .expect("SYNC_COERCED_FIELDS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
