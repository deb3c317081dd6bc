//! API request and response DTOs
//!
//! Successful responses share the `{ "success": true, ... }` envelope;
//! errors are rendered by `AppError`.

use serde::{Deserialize, Serialize};

use crate::data::PerformanceRecord;
use crate::service::QuarantinedRecord;

/// Generic success envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Sync request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub district_id: Option<String>,
}

/// Sync response
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<PerformanceRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quarantined: Vec<QuarantinedRecord>,
}

/// Query parameters for the district performance endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceQuery {
    pub district_id: Option<String>,
    pub year: Option<String>,
}

/// Cache flush result
#[derive(Debug, Clone, Serialize)]
pub struct CacheFlushResponse {
    pub cleared: usize,
}
