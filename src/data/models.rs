//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// District (reference data)
// =============================================================================

/// Administrative district performance is tracked against
///
/// Created by seeding, read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: String,
    /// Stable slug, e.g. "pune"
    pub district_id: String,
    pub name: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// District definition used for seeding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistrictSeed {
    pub district_id: &'static str,
    pub name: &'static str,
    pub state: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

// =============================================================================
// Performance
// =============================================================================

/// Normalized monthly metrics, ready to be upserted
///
/// Keyed by (district_id, month, year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerformance {
    pub district_id: String,
    pub month: i32,
    pub year: i32,
    pub total_households: i64,
    pub total_workers: i64,
    pub person_days: i64,
    pub women_participation: f64,
    pub scst_participation: f64,
    pub total_funds: f64,
    pub funds_utilized: f64,
}

impl NewPerformance {
    /// Composite idempotency key
    pub fn key(&self) -> (&str, i32, i32) {
        (&self.district_id, self.month, self.year)
    }
}

/// Persisted performance record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub id: String,
    pub district_id: String,
    pub month: i32,
    pub year: i32,
    pub total_households: i64,
    pub total_workers: i64,
    pub person_days: i64,
    /// Percentage, expected 0-100 (not enforced)
    pub women_participation: f64,
    /// Percentage, expected 0-100 (not enforced)
    pub scst_participation: f64,
    pub total_funds: f64,
    pub funds_utilized: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Performance record with its owning district, for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceWithDistrict {
    #[serde(flatten)]
    pub record: PerformanceRecord,
    pub district: Option<District>,
}
