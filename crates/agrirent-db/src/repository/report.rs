//! # Report Repository
//!
//! Complaints against listings. Append-only, no status, no deduplication.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use agrirent_core::Report;

/// Repository for listing reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Files a report.
    pub async fn insert(&self, report: &Report) -> DbResult<()> {
        debug!(listing_id = %report.listing_id, reporter_id = %report.reporter_id, "Filing report");

        sqlx::query(
            r#"
            INSERT INTO reports (id, listing_id, reporter_id, reason, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&report.id)
        .bind(&report.listing_id)
        .bind(&report.reporter_id)
        .bind(&report.reason)
        .bind(&report.description)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reports filed against a listing, newest first.
    pub async fn list_for_listing(&self, listing_id: &str) -> DbResult<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, listing_id, reporter_id, reason, description, created_at
            FROM reports
            WHERE listing_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }
}
