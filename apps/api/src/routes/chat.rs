//! Booking chat endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use agrirent_core::Message;

use super::path_id;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::chat_service::{ChatService, ChatThread, PostMessageRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat/{id}/", get(thread).post(post_message))
}

async fn thread(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ChatThread>> {
    Ok(Json(ChatService::new(state).list_messages(&user, path_id(&id)?).await?))
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let message = ChatService::new(state)
        .post_message(&user, path_id(&id)?, req)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
