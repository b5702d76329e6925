//! # Booking Repository
//!
//! Database operations for rental bookings.
//!
//! ## Guarded Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request A (approve)              Request B (reject)                   │
//! │  read: pending, version 0         read: pending, version 0             │
//! │       │                                │                                │
//! │       ▼                                │                                │
//! │  UPDATE ... WHERE status='pending'     │                                │
//! │           AND version=0  → 1 row       │                                │
//! │                                        ▼                                │
//! │                           UPDATE ... WHERE status='pending'            │
//! │                                     AND version=0  → 0 rows            │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                           DbError::Conflict (status stays approved)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Which edges are legal is decided in `agrirent_core::booking`; this module
//! only makes sure the write lands on the row that was checked.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use agrirent_core::{Booking, BookingStatus};

const BOOKING_COLUMNS: &str = r#"
    b.id, b.listing_id, b.borrower_id, b.start_date, b.end_date, b.status,
    b.total_price_paise, b.delivery_requested, b.delivery_fee_paise,
    b.pickup_proof, b.return_proof, b.created_at, b.updated_at, b.version
"#;

/// A status change checked against the row as it was read.
#[derive(Debug, Clone)]
pub struct BookingTransition<'a> {
    /// Status the row must still have.
    pub from: BookingStatus,
    pub to: BookingStatus,
    /// Version the row must still have.
    pub expected_version: i64,
    pub pickup_proof: Option<&'a str>,
    pub return_proof: Option<&'a str>,
}

impl<'a> BookingTransition<'a> {
    /// A transition that leaves both proofs untouched.
    pub fn new(booking: &Booking, to: BookingStatus) -> Self {
        BookingTransition {
            from: booking.status,
            to,
            expected_version: booking.version,
            pickup_proof: None,
            return_proof: None,
        }
    }

    pub fn with_pickup_proof(mut self, path: &'a str) -> Self {
        self.pickup_proof = Some(path);
        self
    }

    pub fn with_return_proof(mut self, path: &'a str) -> Self {
        self.return_proof = Some(path);
        self
    }
}

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Inserts a new booking.
    pub async fn insert(&self, booking: &Booking) -> DbResult<()> {
        debug!(
            id = %booking.id,
            listing_id = %booking.listing_id,
            total_price_paise = booking.total_price_paise,
            "Inserting booking"
        );

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, listing_id, borrower_id, start_date, end_date, status,
                total_price_paise, delivery_requested, delivery_fee_paise,
                pickup_proof, return_proof, created_at, updated_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.listing_id)
        .bind(&booking.borrower_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.status)
        .bind(booking.total_price_paise)
        .bind(booking.delivery_requested)
        .bind(booking.delivery_fee_paise)
        .bind(&booking.pickup_proof)
        .bind(&booking.return_proof)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .bind(booking.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?1");
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    /// Applies a status change if the row still matches what was read.
    ///
    /// Proof columns are only overwritten when a new path is supplied.
    ///
    /// ## Returns
    /// The updated booking.
    ///
    /// ## Errors
    /// * `DbError::Conflict` - status or version moved since the read
    pub async fn transition(&self, id: &str, change: &BookingTransition<'_>) -> DbResult<Booking> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = ?2,
                pickup_proof = COALESCE(?3, pickup_proof),
                return_proof = COALESCE(?4, return_proof),
                updated_at = ?5,
                version = version + 1
            WHERE id = ?1 AND status = ?6 AND version = ?7
            "#,
        )
        .bind(id)
        .bind(change.to)
        .bind(change.pickup_proof)
        .bind(change.return_proof)
        .bind(now)
        .bind(change.from)
        .bind(change.expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(
                booking_id = %id,
                from = %change.from,
                to = %change.to,
                "Booking transition lost a race"
            );
            return Err(DbError::conflict("Booking", id));
        }

        debug!(booking_id = %id, from = %change.from, to = %change.to, "Booking transitioned");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Booking", id))
    }

    /// Bookings made by a borrower, newest first.
    pub async fn list_for_borrower(&self, borrower_id: &str) -> DbResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b \
             WHERE b.borrower_id = ?1 \
             ORDER BY b.created_at DESC, b.rowid DESC"
        );
        let bookings = sqlx::query_as::<_, Booking>(&sql)
            .bind(borrower_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    /// Bookings on listings owned by `owner_id` (incoming requests), newest first.
    pub async fn list_incoming_for_owner(&self, owner_id: &str) -> DbResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b \
             JOIN listings l ON l.id = b.listing_id \
             WHERE l.owner_id = ?1 \
             ORDER BY b.created_at DESC, b.rowid DESC"
        );
        let bookings = sqlx::query_as::<_, Booking>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    /// Number of pending requests awaiting `owner_id`'s decision.
    pub async fn count_pending_for_owner(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings b
            JOIN listings l ON l.id = b.listing_id
            WHERE l.owner_id = ?1 AND b.status = ?2
            "#,
        )
        .bind(owner_id)
        .bind(BookingStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
