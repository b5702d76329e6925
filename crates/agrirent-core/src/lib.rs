//! # agrirent-core: Pure Domain Logic for AgriRent
//!
//! Everything AgriRent knows about tools, bookings and money, expressed as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AgriRent Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    routes ──► services ──► error mapping                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ agrirent-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  booking  │  │ validation│  │   │
//! │  │   │  Listing  │  │   Money   │  │  graph    │  │   forms   │  │   │
//! │  │   │  Booking  │  │  paise    │  │  pricing  │  │   dates   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  agrirent-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Account, Listing, Booking, etc.)
//! - [`money`] - Money type in integer paise
//! - [`booking`] - Status graph, pricing and per-transition permissions
//! - [`error`] - Domain error types
//! - [`validation`] - Form field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use agrirent_core::booking::quote_total;
//! use agrirent_core::Money;
//! use chrono::NaiveDate;
//!
//! let per_day = Money::from_rupees(100);
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
//!
//! assert_eq!(quote_total(per_day, start, end).unwrap(), Money::from_rupees(300));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use booking::{BookingParties, HandoverStage, OwnerDecision};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Size of the "recent tools" slice on the home view.
pub const RECENT_LISTINGS_LIMIT: i64 = 6;

/// Size of the "tools from other farmers" slice on the dashboard.
pub const CROSS_SELL_LIMIT: i64 = 8;

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;
