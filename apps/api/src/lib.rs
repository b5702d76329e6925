//! # AgriRent API
//!
//! JSON-over-HTTP service for the agricultural tool rental marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AgriRent API                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  accounts      │  │  listings      │  │  bookings                  ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • discovery    │  │ • approve / reject         ││
//! │  │ • login/logout │  │ • tool detail  │  │ • handover proof           ││
//! │  │ • profile      │  │ • book tool    │  │ • review                   ││
//! │  │ • dashboard    │  │ • add tool     │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  chat          │  │  reports       │  │  admin                     ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  SQLite (agrirent-db)   MediaStore (uploads)   JWT (sessions)     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]; every key can be set through an
//! `AGRIRENT_*` environment variable.

pub mod auth;
pub mod config;
pub mod error;
pub mod media;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tracing::{info, info_span, warn, Instrument};

use agrirent_db::Database;

// Re-exports
pub use crate::config::ApiConfig;
pub use crate::error::{ApiError, ApiResult, ErrorCode};

use crate::auth::JwtManager;
use crate::media::MediaStore;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
    pub jwt: JwtManager,
    pub media: MediaStore,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);
        let media = MediaStore::new(&config.media_root);
        AppState {
            db,
            config,
            jwt,
            media,
        }
    }
}

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(routes::pages::routes())
        .merge(routes::accounts::routes())
        .merge(routes::listings::routes())
        .merge(routes::bookings::routes())
        .merge(routes::chat::routes())
        .merge(routes::reports::routes())
        .merge(routes::admin::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// One span and one log line per request.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = info_span!("request", %method, %path);

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| {
        if response.status().is_server_error() {
            warn!(status, latency_ms, "Request failed");
        } else {
            info!(status, latency_ms, "Request handled");
        }
    });
    response
}
