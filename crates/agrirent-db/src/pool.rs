//! # Connection Pool
//!
//! Opens the SQLite store behind every repository.
//!
//! ```text
//! DbConfig ─────────────► Database::new ──► SqlitePool ──► repositories
//!  ├── File(path)          ├── WAL + foreign keys     (accounts(), bookings(), ...)
//!  └── Memory (tests)      └── embedded migrations
//! ```
//!
//! SQLite serializes writers; booking transitions additionally guard on
//! status and version so a lost race is reported, not overwritten.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::account::AccountRepository;
use crate::repository::booking::BookingRepository;
use crate::repository::listing::ListingRepository;
use crate::repository::message::MessageRepository;
use crate::repository::report::ReportRepository;
use crate::repository::review::ReviewRepository;
use crate::repository::token::RevokedTokenRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A file, created on first use.
    File(PathBuf),
    /// A private in-memory database owned by a single connection.
    Memory,
}

/// Pool settings.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/agrirent/agrirent.db").pool_size(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,
    /// Upper bound on open connections (default 5).
    pub pool_size: u32,
    /// Connections kept open while idle (default 1).
    pub keep_alive: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// Idle connections above `keep_alive` are closed after this.
    pub idle_timeout: Duration,
    /// Apply embedded migrations when connecting (default true).
    pub migrate: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            pool_size: 5,
            keep_alive: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            migrate: true,
        }
    }

    /// Isolated in-memory database for tests. Gone once the pool drops.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            pool_size: 1,
            keep_alive: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            migrate: true,
        }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    pub fn keep_alive(mut self, connections: u32) -> Self {
        self.keep_alive = connections;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            // The default filename is ":memory:"
            DbLocation::Memory => SqliteConnectOptions::new(),
        };

        options
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default
            .foreign_keys(true)
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.pool_size)
            .min_connections(self.keep_alive)
            .acquire_timeout(self.acquire_timeout);

        match self.location {
            // The database dies with its only connection
            DbLocation::Memory => options.idle_timeout(None).max_lifetime(None),
            DbLocation::File(_) => options.idle_timeout(Some(self.idle_timeout)),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the store; hands out repositories over a shared pool.
///
/// ## Usage in Handlers
/// ```rust,ignore
/// async fn discovery(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Listing>>> {
///     let tools = state.db.listings().discover("", "").await?;
///     Ok(Json(tools))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and, unless disabled, migrates to the latest schema.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, "Opening database");

        let pool = config
            .pool_options()
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(pool_size = config.pool_size, "Pool ready");

        let db = Database { pool };
        if config.migrate {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for migrations tooling and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the account and profile repository.
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.pool.clone())
    }

    /// Returns the listing repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let recent = db.listings().recent(6).await?;
    /// ```
    pub fn listings(&self) -> ListingRepository {
        ListingRepository::new(self.pool.clone())
    }

    /// Returns the booking repository.
    pub fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.pool.clone())
    }

    /// Returns the chat message repository.
    pub fn messages(&self) -> MessageRepository {
        MessageRepository::new(self.pool.clone())
    }

    /// Returns the review repository.
    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new(self.pool.clone())
    }

    /// Returns the report repository.
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Returns the revoked-token repository.
    pub fn revoked_tokens(&self) -> RevokedTokenRepository {
        RevokedTokenRepository::new(self.pool.clone())
    }

    /// Waits for in-flight queries, then refuses new ones.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// `SELECT 1` round trip.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
