//! Upstream open-data API
//!
//! - `client`: cache-aware HTTP client with retry and fan-out fetches
//! - `record`: ingestion schema and normalization rules
//! - `retry`: backoff policy

mod client;
mod record;
mod retry;

pub use client::{ALL_DISTRICTS_CACHE_KEY, DataGovClient, DistrictFetch, district_cache_key};
pub use record::{
    FIELD_RULES, Fallback, Field, FieldIssue, FieldKind, FieldRule, Normalized, Period, RawRecord,
    normalize,
};
pub use retry::RetryPolicy;
