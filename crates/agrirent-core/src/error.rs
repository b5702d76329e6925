//! # Domain Errors
//!
//! ```text
//!   validation.rs ──► ValidationError ─┐
//!                                      ├──► CoreError ──► ApiError (status + JSON)
//!   booking.rs ────► CoreError ────────┘
//!                                           DbError (agrirent-db) ──► ApiError
//! ```
//!
//! Nothing in this file is retryable except [`CoreError::Conflict`], and
//! even that needs a fresh read first.

use thiserror::Error;

use crate::types::BookingStatus;

// =============================================================================
// Core Error
// =============================================================================

/// A rule of the rental marketplace said no.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The actor is authenticated but not allowed to perform the action.
    ///
    /// ## When This Occurs
    /// - A non-owner tries to approve or reject a booking
    /// - Someone other than the borrower uploads a handover proof
    /// - A third party tries to read or post in a booking chat
    #[error("Not authorized to {action}")]
    PermissionDenied { action: String },

    /// Absent, or hidden from this actor (unapproved listings).
    #[error("No {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// At-most-once record already exists.
    ///
    /// ## When This Occurs
    /// - Registering a mobile number twice
    /// - A second review for the same booking
    #[error("{entity} with this {field} already exists")]
    Duplicate { entity: String, field: String },

    /// Requested status change is not an edge of the booking graph.
    ///
    /// ## User Workflow
    /// ```text
    /// Borrower uploads pickup proof
    ///      │
    ///      ▼
    /// Booking is still pending
    ///      │
    ///      ▼
    /// InvalidTransition { from: Pending, to: PickedUp }
    ///      │
    ///      ▼
    /// UI shows: "Booking cannot move from pending to picked_up"
    /// ```
    #[error("Booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// The row changed between read and guarded write.
    #[error("Booking {booking_id} was modified concurrently, reload and retry")]
    Conflict { booking_id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn denied(action: impl Into<String>) -> Self {
        CoreError::PermissionDenied {
            action: action.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity: impl Into<String>, field: impl Into<String>) -> Self {
        CoreError::Duplicate {
            entity: entity.into(),
            field: field.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Bad form or query input. Every variant names the field to flag.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Missing, or only whitespace.
    #[error("{field}: this field is required")]
    Required { field: String },

    #[error("{field}: needs at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field}: allows at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Inclusive bounds.
    #[error("{field}: expected a value from {min} to {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field}: must be greater than zero")]
    MustBePositive { field: String },

    /// Unparseable text: a date that is not YYYY-MM-DD, a mobile number with letters.
    #[error("{field}: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Outside a closed vocabulary (categories, decisions, file types).
    #[error("{field}: expected one of {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Password confirmation.
    #[error("{field} does not match {other}")]
    Mismatch { field: String, other: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Mismatch { field, .. } => field,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
