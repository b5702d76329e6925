//! # agrirent-db: Database Layer for AgriRent
//!
//! SQLite persistence for accounts, listings, bookings and their feedback.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AgriRent Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /booking/{id}/approve/)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   agrirent-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ AccountRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ListingRepo   │    │ 001_init.sql │  │   │
//! │  │   │               │    │ BookingRepo   │    │              │  │   │
//! │  │   │               │    │ Message/...   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL, foreign keys on)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agrirent_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("agrirent.db")).await?;
//! let tools = db.listings().discover("plow", "").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};

pub use repository::account::AccountRepository;
pub use repository::booking::{BookingRepository, BookingTransition};
pub use repository::listing::ListingRepository;
pub use repository::message::MessageRepository;
pub use repository::report::ReportRepository;
pub use repository::review::ReviewRepository;
pub use repository::token::RevokedTokenRepository;
