//! Performance query service
//!
//! Read-only retrieval for display.

use std::sync::Arc;

use crate::data::{Database, PerformanceRecord, PerformanceWithDistrict};
use crate::error::AppError;

/// Performance query service
pub struct PerformanceService {
    db: Arc<Database>,
}

impl PerformanceService {
    /// Create new performance service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List a district's records, most recent first
    ///
    /// Ordered by year descending, then month descending. An unknown
    /// district or a year without data yields an empty list.
    ///
    /// # Arguments
    /// * `district_id` - District slug
    /// * `year` - Restrict to a single year
    pub async fn list_performance(
        &self,
        district_id: &str,
        year: Option<i32>,
    ) -> Result<Vec<PerformanceRecord>, AppError> {
        let district_id = district_id.trim();
        if district_id.is_empty() {
            return Err(AppError::Validation("District ID required".to_string()));
        }

        self.db.list_performance(district_id, year).await
    }

    /// Like [`Self::list_performance`], each record carrying its district
    pub async fn list_performance_with_district(
        &self,
        district_id: &str,
        year: Option<i32>,
    ) -> Result<Vec<PerformanceWithDistrict>, AppError> {
        let records = self.list_performance(district_id, year).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let district = self.db.get_district(district_id.trim()).await?;
        Ok(records
            .into_iter()
            .map(|record| PerformanceWithDistrict {
                record,
                district: district.clone(),
            })
            .collect())
    }
}
