//! Performance data endpoints
//!
//! Consumed by the dashboard front-end.

use axum::{
    Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Json,
    routing::{delete, get, post},
};

use super::dto::{
    ApiResponse, CacheFlushResponse, PerformanceQuery, SyncRequest, SyncResponse,
};
use crate::AppState;
use crate::data::{District, PerformanceWithDistrict};
use crate::error::AppError;
use crate::service::{PerformanceService, SyncService};

/// Create data router
///
/// Routes:
/// - POST /api/data/sync - Sync a district from the upstream API
/// - GET /api/data/district - List a district's performance records
/// - GET /api/districts - List reference districts
/// - DELETE /api/cache - Flush the upstream response cache
pub fn data_router() -> Router<AppState> {
    Router::new()
        .route("/data/sync", post(sync_district))
        .route("/data/district", get(district_performance))
        .route("/districts", get(list_districts))
        .route("/cache", delete(flush_cache))
}

/// POST /api/data/sync
async fn sync_district(
    State(state): State<AppState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<SyncResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;

    let district_id = request
        .district_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("District ID required".to_string()))?;

    let service = SyncService::new(
        state.db.clone(),
        state.upstream.clone(),
        state.config.sync.policy,
    );
    let outcome = service.sync_district(&district_id).await?;

    Ok(Json(SyncResponse {
        success: true,
        message: format!("Synced {} records", outcome.records.len()),
        data: outcome.records,
        quarantined: outcome.quarantined,
    }))
}

/// GET /api/data/district?districtId=...&year=...
async fn district_performance(
    State(state): State<AppState>,
    query: Result<Query<PerformanceQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<PerformanceWithDistrict>>>, AppError> {
    let Query(query) =
        query.map_err(|e| AppError::Validation(format!("Invalid query string: {e}")))?;

    let district_id = query
        .district_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("District ID required".to_string()))?;

    let year = match query.year.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i32>()
                .map_err(|_| AppError::Validation(format!("Invalid year: {raw}")))?,
        ),
    };

    let service = PerformanceService::new(state.db.clone());
    let records = service
        .list_performance_with_district(&district_id, year)
        .await?;

    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/districts
async fn list_districts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<District>>>, AppError> {
    let districts = state.db.list_districts().await?;
    Ok(Json(ApiResponse::ok(districts)))
}

/// DELETE /api/cache
async fn flush_cache(State(state): State<AppState>) -> Json<ApiResponse<CacheFlushResponse>> {
    let cleared = state.cache.len().await;
    state.cache.clear().await;
    Json(ApiResponse::ok(CacheFlushResponse { cleared }))
}
