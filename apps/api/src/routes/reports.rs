//! Listing reports.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use agrirent_core::Report;

use super::path_id;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::report_service::{ReportRequest, ReportService};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tool/{id}/report/", post(report_tool))
}

async fn report_tool(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let report = ReportService::new(state)
        .file_report(&user, path_id(&id)?, req)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}
