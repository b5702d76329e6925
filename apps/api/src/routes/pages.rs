//! Home, static info pages and the liveness probe.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use agrirent_core::{Listing, ToolCategory};

use crate::error::ApiResult;
use crate::services::listing_service::ListingService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/about/", get(about))
        .route("/contact/", get(contact))
        .route("/healthz", get(health))
}

#[derive(Debug, Serialize)]
pub struct Home {
    pub recent_listings: Vec<Listing>,
    pub categories: Vec<CategoryOption>,
}

#[derive(Debug, Serialize)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

async fn home(State(state): State<Arc<AppState>>) -> ApiResult<Json<Home>> {
    let recent_listings = ListingService::new(state).recent().await?;
    let categories = ToolCategory::ALL
        .iter()
        .map(|c| CategoryOption {
            value: c.as_str(),
            label: c.label(),
        })
        .collect();

    Ok(Json(Home {
        recent_listings,
        categories,
    }))
}

async fn about() -> Json<serde_json::Value> {
    Json(json!({
        "page": "about",
        "title": "About AgriRent",
        "body": "AgriRent lets farmers rent tools from neighbours and list their own idle equipment.",
    }))
}

async fn contact() -> Json<serde_json::Value> {
    Json(json!({
        "page": "contact",
        "title": "Contact",
        "body": "Reach the AgriRent team through your district office.",
    }))
}

/// Liveness plus a database round trip.
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok", "database": "ok" })))
    } else {
        tracing::error!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unreachable" })),
        )
    }
}
