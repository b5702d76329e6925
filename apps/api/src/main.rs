//! # AgriRent API Server
//!
//! ```text
//! ApiConfig::load ──► Database::new (migrations) ──► MediaStore dirs
//!        │
//!        ▼
//! axum::serve on http_host:http_port ──► graceful shutdown on Ctrl+C / SIGTERM
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agrirent_api::{router, ApiConfig, AppState};
use agrirent_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting AgriRent API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        media_root = %config.media_root,
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database_path).pool_size(config.db_max_connections),
    )
    .await?;
    info!("Database ready");

    match db.revoked_tokens().purge_expired(Utc::now()).await {
        Ok(purged) if purged > 0 => info!(purged, "Purged expired revoked tokens"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to purge revoked tokens"),
    }

    let state = Arc::new(AppState::new(db, config));
    state
        .media
        .ensure_dirs()
        .await
        .with_context(|| format!("creating media root {}", state.media.root().display()))?;

    let addr: SocketAddr = format!("{}:{}", state.config.http_host, state.config.http_port)
        .parse()
        .context("invalid http_host/http_port")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
