//! Administrator actions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use agrirent_core::{Listing, Profile};

use super::path_id;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::account_service::AccountService;
use crate::services::listing_service::ListingService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/tool/{id}/approve/", post(approve_tool))
        .route("/admin/profile/{username}/verify/", post(verify_profile))
}

async fn approve_tool(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Listing>> {
    let listing = ListingService::new(state)
        .approve_listing(&admin, path_id(&id)?)
        .await?;
    Ok(Json(listing))
}

async fn verify_profile(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<Profile>> {
    let profile = AccountService::new(state)
        .verify_profile(&admin, &username)
        .await?;
    Ok(Json(profile))
}
