//! Registration, sessions, profiles and the dashboard.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::account_service::{
    AccountService, Dashboard, LoginRequest, Notifications, PublicProfile, RegisterRequest,
    SessionResponse,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/logout/", post(logout))
        .route("/profile/{username}/", get(profile))
        .route("/dashboard/", get(dashboard))
        .route("/notifications/", get(notifications))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let session = AccountService::new(state).register(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(AccountService::new(state).login(req).await?))
}

async fn logout(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<StatusCode> {
    AccountService::new(state).logout(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<PublicProfile>> {
    Ok(Json(AccountService::new(state).public_profile(&username).await?))
}

async fn dashboard(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<Dashboard>> {
    Ok(Json(AccountService::new(state).dashboard(&user).await?))
}

async fn notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Notifications>> {
    Ok(Json(AccountService::new(state).notifications(&user).await?))
}
