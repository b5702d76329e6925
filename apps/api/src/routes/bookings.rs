//! Owner decisions, handover proofs and reviews.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use agrirent_core::{Booking, Review};

use super::path_id;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::media::UploadForm;
use crate::services::booking_service::{BookingService, ReviewRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking/{id}/proof/", post(upload_proof))
        .route("/booking/{id}/review/", post(review))
        .route("/booking/{id}/{action}/", post(decide))
}

/// `approve` or `reject`; anything else is a validation error.
async fn decide(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, action)): Path<(String, String)>,
) -> ApiResult<Json<Booking>> {
    let booking = BookingService::new(state)
        .decide(&user, path_id(&id)?, &action)
        .await?;
    Ok(Json(booking))
}

async fn upload_proof(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Booking>> {
    let form = UploadForm::read(multipart).await?;
    let booking = BookingService::new(state)
        .record_handover(&user, path_id(&id)?, form)
        .await?;
    Ok(Json(booking))
}

async fn review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = BookingService::new(state)
        .leave_review(&user, path_id(&id)?, req)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
