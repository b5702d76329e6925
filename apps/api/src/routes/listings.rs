//! Discovery, listing detail, booking requests and new listings.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use agrirent_core::{Booking, Listing};

use super::path_id;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiResult;
use crate::media::UploadForm;
use crate::services::booking_service::{BookingService, CreateBookingRequest};
use crate::services::listing_service::{Discovery, DiscoveryQuery, ListingDetail, ListingService};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/discovery/", get(discovery))
        .route("/tool/{id}/", get(tool_detail).post(book_tool))
        .route("/add-tool/", post(add_tool))
}

async fn discovery(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoveryQuery>,
) -> ApiResult<Json<Discovery>> {
    Ok(Json(ListingService::new(state).discover(query).await?))
}

async fn tool_detail(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ListingDetail>> {
    let detail = ListingService::new(state)
        .get_listing(viewer.as_ref(), path_id(&id)?)
        .await?;
    Ok(Json(detail))
}

async fn book_tool(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    let booking = BookingService::new(state)
        .create_booking(&user, path_id(&id)?, req)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn add_tool(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Listing>)> {
    let form = UploadForm::read(multipart).await?;
    let listing = ListingService::new(state).submit_listing(&user, form).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}
