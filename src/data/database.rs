//! SQLite database operations
//!
//! All database access goes through this module.

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically. Foreign keys are enforced.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Districts (reference data)
    // =========================================================================

    /// Insert or refresh reference districts
    ///
    /// Existing rows keep their id and creation time; name, state and
    /// coordinates are overwritten. Runs in one transaction.
    ///
    /// # Returns
    /// Number of districts written
    pub async fn seed_districts(&self, districts: &[DistrictSeed]) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for district in districts {
            sqlx::query(
                r#"
                INSERT INTO district (id, district_id, name, state, latitude, longitude, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(district_id) DO UPDATE SET
                    name = excluded.name,
                    state = excluded.state,
                    latitude = excluded.latitude,
                    longitude = excluded.longitude
                "#,
            )
            .bind(EntityId::new().0)
            .bind(district.district_id)
            .bind(district.name)
            .bind(district.state)
            .bind(district.latitude)
            .bind(district.longitude)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(districts.len())
    }

    /// List all districts ordered by state, then name
    pub async fn list_districts(&self) -> Result<Vec<District>, AppError> {
        let districts =
            sqlx::query_as::<_, District>("SELECT * FROM district ORDER BY state, name")
                .fetch_all(&self.pool)
                .await?;

        Ok(districts)
    }

    /// Get a district by its slug
    pub async fn get_district(&self, district_id: &str) -> Result<Option<District>, AppError> {
        let district =
            sqlx::query_as::<_, District>("SELECT * FROM district WHERE district_id = ?")
                .bind(district_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(district)
    }

    // =========================================================================
    // Performance
    // =========================================================================

    /// Upsert a batch of performance records atomically
    ///
    /// For each (district_id, month, year) the existing row is updated in
    /// place (keeping its id and `created_at`), otherwise a new row is
    /// inserted. Any failure rolls back the whole batch.
    ///
    /// # Returns
    /// The stored rows, in input order
    pub async fn upsert_performance_batch(
        &self,
        records: &[NewPerformance],
    ) -> Result<Vec<PerformanceRecord>, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut stored = Vec::with_capacity(records.len());

        for record in records {
            let row = sqlx::query_as::<_, PerformanceRecord>(
                r#"
                INSERT INTO performance (
                    id, district_id, month, year,
                    total_households, total_workers, person_days,
                    women_participation, scst_participation,
                    total_funds, funds_utilized,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(district_id, month, year) DO UPDATE SET
                    total_households = excluded.total_households,
                    total_workers = excluded.total_workers,
                    person_days = excluded.person_days,
                    women_participation = excluded.women_participation,
                    scst_participation = excluded.scst_participation,
                    total_funds = excluded.total_funds,
                    funds_utilized = excluded.funds_utilized,
                    updated_at = excluded.updated_at
                RETURNING *
                "#,
            )
            .bind(EntityId::new().0)
            .bind(&record.district_id)
            .bind(record.month)
            .bind(record.year)
            .bind(record.total_households)
            .bind(record.total_workers)
            .bind(record.person_days)
            .bind(record.women_participation)
            .bind(record.scst_participation)
            .bind(record.total_funds)
            .bind(record.funds_utilized)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            stored.push(row);
        }

        // Dropping `tx` on an early return above rolls the batch back.
        tx.commit().await?;
        Ok(stored)
    }

    /// List performance for a district, most recent first
    ///
    /// # Arguments
    /// * `district_id` - District slug
    /// * `year` - Restrict to a single year
    pub async fn list_performance(
        &self,
        district_id: &str,
        year: Option<i32>,
    ) -> Result<Vec<PerformanceRecord>, AppError> {
        let records = sqlx::query_as::<_, PerformanceRecord>(
            r#"
            SELECT * FROM performance
            WHERE district_id = ? AND (? IS NULL OR year = ?)
            ORDER BY year DESC, month DESC
            "#,
        )
        .bind(district_id)
        .bind(year)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
