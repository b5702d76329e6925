//! Listing reports.
//!
//! Any signed-in account may report any existing listing, approved or not.
//! Reports are not deduplicated and carry no status.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use agrirent_core::validation::validate_report_reason;
use agrirent_core::Report;
use agrirent_db::repository::generate_id;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

/// Report service implementation.
pub struct ReportService {
    state: Arc<AppState>,
}

impl ReportService {
    pub fn new(state: Arc<AppState>) -> Self {
        ReportService { state }
    }

    pub async fn file_report(
        &self,
        reporter: &AuthUser,
        listing_id: &str,
        req: ReportRequest,
    ) -> ApiResult<Report> {
        let listing = self
            .state
            .db
            .listings()
            .get_by_id(listing_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Listing", listing_id))?;

        let report = Report {
            id: generate_id(),
            listing_id: listing.id,
            reporter_id: reporter.account_id.clone(),
            reason: validate_report_reason(&req.reason)?,
            description: req.description.trim().to_string(),
            created_at: Utc::now(),
        };

        self.state.db.reports().insert(&report).await?;
        info!(
            report_id = %report.id,
            listing_id = %report.listing_id,
            reason = %report.reason,
            "Listing reported"
        );
        Ok(report)
    }
}
