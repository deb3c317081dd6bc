//! Sync service
//!
//! Pulls a district's records from the upstream API, normalizes them and
//! upserts them in one transaction keyed by (district, month, year).

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::NormalizationPolicy;
use crate::data::{Database, NewPerformance, PerformanceRecord};
use crate::error::AppError;
use crate::metrics::{SYNC_COERCED_FIELDS_TOTAL, SYNC_RECORDS_TOTAL, SYNC_RUNS_TOTAL};
use crate::upstream::{DataGovClient, FieldIssue, Period, RawRecord, normalize};

/// A row left out of the batch under the strict policy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantinedRecord {
    /// Position in the upstream `records` list
    pub index: usize,
    pub issues: Vec<FieldIssue>,
}

/// Result of a district sync
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Stored rows, in upstream order
    pub records: Vec<PerformanceRecord>,
    pub quarantined: Vec<QuarantinedRecord>,
}

/// Records ready to persist, plus the ones held back
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub records: Vec<NewPerformance>,
    pub quarantined: Vec<QuarantinedRecord>,
}

/// Normalize an upstream payload into a batch
///
/// # Errors
/// `NotFound` when the payload carries no `records` list
pub fn prepare_batch(
    payload: &Value,
    district_id: &str,
    period: Period,
    policy: NormalizationPolicy,
) -> Result<PreparedBatch, AppError> {
    let rows = payload
        .get("records")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::NotFound("No data received from API".to_string()))?;

    let mut batch = PreparedBatch::default();

    for (index, row) in rows.iter().enumerate() {
        let (raw, mut issues) = match RawRecord::from_value(row) {
            Some(raw) => (raw, Vec::new()),
            None => (
                RawRecord::default(),
                vec![FieldIssue {
                    field: "record",
                    raw: row.clone(),
                }],
            ),
        };

        let normalized = normalize(&raw, district_id, period);
        issues.extend(normalized.issues);

        if issues.is_empty() {
            batch.records.push(normalized.record);
            continue;
        }

        match policy {
            NormalizationPolicy::Lenient => {
                for issue in &issues {
                    tracing::warn!(
                        district_id,
                        index,
                        field = issue.field,
                        raw = %issue.raw,
                        "Malformed upstream field replaced by default"
                    );
                    SYNC_COERCED_FIELDS_TOTAL
                        .with_label_values(&[issue.field])
                        .inc();
                }
                batch.records.push(normalized.record);
            }
            NormalizationPolicy::Strict => {
                tracing::warn!(
                    district_id,
                    index,
                    fields = ?issues.iter().map(|i| i.field).collect::<Vec<_>>(),
                    "Quarantining malformed upstream record"
                );
                batch.quarantined.push(QuarantinedRecord { index, issues });
            }
        }
    }

    Ok(batch)
}

/// Sync service
pub struct SyncService {
    db: Arc<Database>,
    upstream: Arc<DataGovClient>,
    policy: NormalizationPolicy,
}

impl SyncService {
    /// Create new sync service
    pub fn new(
        db: Arc<Database>,
        upstream: Arc<DataGovClient>,
        policy: NormalizationPolicy,
    ) -> Self {
        Self {
            db,
            upstream,
            policy,
        }
    }

    /// Sync all upstream records for a district
    ///
    /// Missing month/year values default to the current calendar month.
    ///
    /// # Errors
    /// - `Validation` when `district_id` is blank (no network call made)
    /// - upstream errors after all retry attempts
    /// - `NotFound` when the upstream payload has no record list
    /// - `Database` when the batch fails; nothing is persisted
    pub async fn sync_district(&self, district_id: &str) -> Result<SyncOutcome, AppError> {
        self.sync_district_at(district_id, Period::current()).await
    }

    /// Same as [`Self::sync_district`] with an explicit fallback period
    pub async fn sync_district_at(
        &self,
        district_id: &str,
        period: Period,
    ) -> Result<SyncOutcome, AppError> {
        let district_id = district_id.trim();
        if district_id.is_empty() {
            return Err(AppError::Validation("District ID required".to_string()));
        }

        let result = self.run(district_id, period).await;
        let status = if result.is_ok() { "success" } else { "failure" };
        SYNC_RUNS_TOTAL.with_label_values(&[status]).inc();

        if let Err(error) = &result {
            tracing::error!(district_id, %error, "Sync failed");
        }
        result
    }

    async fn run(&self, district_id: &str, period: Period) -> Result<SyncOutcome, AppError> {
        let payload = self
            .upstream
            .fetch_district_performance_with_retry(district_id, None)
            .await?;

        let batch = prepare_batch(&payload, district_id, period, self.policy)?;
        let records = self.db.upsert_performance_batch(&batch.records).await?;

        SYNC_RECORDS_TOTAL
            .with_label_values(&["upserted"])
            .inc_by(records.len() as u64);
        SYNC_RECORDS_TOTAL
            .with_label_values(&["quarantined"])
            .inc_by(batch.quarantined.len() as u64);

        tracing::info!(
            district_id,
            upserted = records.len(),
            quarantined = batch.quarantined.len(),
            "District synced"
        );

        Ok(SyncOutcome {
            records,
            quarantined: batch.quarantined,
        })
    }
}
