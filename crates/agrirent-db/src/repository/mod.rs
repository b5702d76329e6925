//! # Repository Module
//!
//! One repository per table family. Each holds a pool clone and owns the
//! SQL for its rows; nothing outside this module writes SQL.
//!
//! ## Repository Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database                                                               │
//! │  ├── accounts()        → AccountRepository     accounts + profiles      │
//! │  ├── listings()        → ListingRepository     listings, discovery      │
//! │  ├── bookings()        → BookingRepository     guarded transitions      │
//! │  ├── messages()        → MessageRepository     append-only chat         │
//! │  ├── reviews()         → ReviewRepository      one per booking          │
//! │  ├── reports()         → ReportRepository      append-only complaints   │
//! │  └── revoked_tokens()  → RevokedTokenRepository  logout list            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod account;
pub mod booking;
pub mod listing;
pub mod message;
pub mod report;
pub mod review;
pub mod token;

/// Helper to generate a new row ID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
