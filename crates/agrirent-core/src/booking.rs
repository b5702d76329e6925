//! # Booking Engine
//!
//! The rental lifecycle as pure functions: which edges exist, who may take
//! them, and what a booking costs.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Booking Lifecycle                               │
//! │                                                                         │
//! │   create        owner: approve     borrower: pickup   borrower: return  │
//! │  ────────► pending ──────────► approved ──────────► picked_up ────────► │
//! │               │                                                 returned│
//! │               │  owner: reject                                          │
//! │               └──────────────► rejected                                 │
//! │                                                                         │
//! │  rejected and returned are terminal. Nothing moves backwards.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Who Calls What
//! The service layer loads the booking and its listing, asks this module for
//! a verdict (`plan_*`), and only then performs the guarded database write.
//! No function here touches storage, so every rule is unit-testable.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::BookingStatus;

// =============================================================================
// Transition Graph
// =============================================================================

impl BookingStatus {
    /// Returns true when `next` is a direct edge from `self`.
    pub const fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Approved)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Approved, BookingStatus::PickedUp)
                | (BookingStatus::PickedUp, BookingStatus::Returned)
        )
    }

    /// Validates the edge and returns the new status.
    pub fn transition(&self, next: BookingStatus) -> CoreResult<BookingStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }

    /// Rejected and returned bookings never change again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Returned)
    }
}

// =============================================================================
// Boundary Enums
// =============================================================================

/// The owner's answer to a pending request.
///
/// Parsed from the `{action}` path segment; anything other than
/// `approve`/`reject` fails before reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerDecision {
    Approve,
    Reject,
}

impl OwnerDecision {
    pub const fn target(&self) -> BookingStatus {
        match self {
            OwnerDecision::Approve => BookingStatus::Approved,
            OwnerDecision::Reject => BookingStatus::Rejected,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OwnerDecision::Approve => "approve",
            OwnerDecision::Reject => "reject",
        }
    }
}

impl FromStr for OwnerDecision {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(OwnerDecision::Approve),
            "reject" => Ok(OwnerDecision::Reject),
            _ => Err(ValidationError::NotAllowed {
                field: "action".to_string(),
                allowed: vec!["approve".to_string(), "reject".to_string()],
            }),
        }
    }
}

/// Which handover a proof image documents.
///
/// The borrower states the intended stage explicitly; the engine checks it
/// against the current status instead of guessing from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoverStage {
    Pickup,
    Return,
}

impl HandoverStage {
    /// Status the booking must be in for this stage.
    pub const fn requires(&self) -> BookingStatus {
        match self {
            HandoverStage::Pickup => BookingStatus::Approved,
            HandoverStage::Return => BookingStatus::PickedUp,
        }
    }

    /// Status the booking moves to.
    pub const fn target(&self) -> BookingStatus {
        match self {
            HandoverStage::Pickup => BookingStatus::PickedUp,
            HandoverStage::Return => BookingStatus::Returned,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            HandoverStage::Pickup => "pickup",
            HandoverStage::Return => "return",
        }
    }
}

impl FromStr for HandoverStage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pickup" => Ok(HandoverStage::Pickup),
            "return" => Ok(HandoverStage::Return),
            _ => Err(ValidationError::NotAllowed {
                field: "stage".to_string(),
                allowed: vec!["pickup".to_string(), "return".to_string()],
            }),
        }
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Number of days charged for a rental.
///
/// ## Rules
/// - `end - start` in whole days, floored to 1 (same-day rentals cost a day)
/// - `end` before `start` is rejected
///
/// ## Example
/// ```rust
/// use agrirent_core::booking::rental_days;
/// use chrono::NaiveDate;
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// assert_eq!(rental_days(jan(1), jan(4)).unwrap(), 3);
/// assert_eq!(rental_days(jan(1), jan(1)).unwrap(), 1);
/// assert!(rental_days(jan(4), jan(1)).is_err());
/// ```
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> Result<i64, ValidationError> {
    if end < start {
        return Err(ValidationError::InvalidFormat {
            field: "end_date".to_string(),
            reason: "must not be before start_date".to_string(),
        });
    }
    Ok((end - start).num_days().max(1))
}

/// Computes the frozen booking total: `price_per_day × rental_days`.
///
/// ## User Workflow
/// ```text
/// Borrower picks 2024-01-01 → 2024-01-04 on a ₹100/day tractor
///      │
///      ▼
/// quote_total(₹100, start, end) ← THIS FUNCTION
///      │
///      ├── end < start?  → ValidationError
///      ├── overflow?     → ValidationError
///      │
///      ▼
/// ₹300.00 stored on the booking, never recomputed
/// ```
pub fn quote_total(
    price_per_day: Money,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Money, ValidationError> {
    let days = rental_days(start, end)?;
    price_per_day
        .checked_times(days)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "end_date".to_string(),
            reason: "rental period is too long for this price".to_string(),
        })
}

// =============================================================================
// Parties & Permissions
// =============================================================================

/// The two accounts involved in a booking.
#[derive(Debug, Clone, Copy)]
pub struct BookingParties<'a> {
    pub borrower_id: &'a str,
    /// Owner of the booked listing.
    pub owner_id: &'a str,
}

impl<'a> BookingParties<'a> {
    pub fn new(borrower_id: &'a str, owner_id: &'a str) -> Self {
        Self {
            borrower_id,
            owner_id,
        }
    }

    pub fn is_party(&self, actor: &str) -> bool {
        actor == self.borrower_id || actor == self.owner_id
    }

    /// The other side of the booking, or `None` for outsiders.
    ///
    /// When an owner books their own listing both sides are the same
    /// account, and the counterpart is that account.
    pub fn counterpart(&self, actor: &str) -> Option<&'a str> {
        if actor == self.borrower_id {
            Some(self.owner_id)
        } else if actor == self.owner_id {
            Some(self.borrower_id)
        } else {
            None
        }
    }

    /// Gate for reading or posting in the booking chat.
    pub fn ensure_party(&self, actor: &str, action: &str) -> CoreResult<()> {
        if self.is_party(actor) {
            Ok(())
        } else {
            Err(CoreError::denied(action))
        }
    }
}

/// Checks an owner decision and returns the status to write.
///
/// Permission is checked before state so outsiders learn nothing about
/// the booking.
pub fn plan_decision(
    current: BookingStatus,
    parties: &BookingParties<'_>,
    actor: &str,
    decision: OwnerDecision,
) -> CoreResult<BookingStatus> {
    if actor != parties.owner_id {
        return Err(CoreError::denied(format!(
            "{} this booking",
            decision.as_str()
        )));
    }
    current.transition(decision.target())
}

/// Checks a handover proof upload and returns the status to write.
///
/// ## Rules
/// - Only the borrower may upload
/// - An image must accompany the request
/// - The stage must match the current status exactly
pub fn plan_handover(
    current: BookingStatus,
    parties: &BookingParties<'_>,
    actor: &str,
    stage: HandoverStage,
    has_image: bool,
) -> CoreResult<BookingStatus> {
    if actor != parties.borrower_id {
        return Err(CoreError::denied("upload proof for this booking"));
    }
    if !has_image {
        return Err(ValidationError::Required {
            field: "proof_image".to_string(),
        }
        .into());
    }
    if current != stage.requires() {
        return Err(CoreError::InvalidTransition {
            from: current,
            to: stage.target(),
        });
    }
    current.transition(stage.target())
}

/// Checks a review request and returns the reviewee's account id.
///
/// ## Rules
/// - Reviewer must be a party; reviewee is the other party
/// - Booking must be returned
/// - Rating 1 to 5
/// - At most one review per booking
pub fn plan_review<'a>(
    current: BookingStatus,
    parties: &BookingParties<'a>,
    actor: &str,
    rating: i64,
    already_reviewed: bool,
) -> CoreResult<&'a str> {
    let reviewee = parties
        .counterpart(actor)
        .ok_or_else(|| CoreError::denied("review this booking"))?;

    if current != BookingStatus::Returned {
        return Err(CoreError::denied(
            "review a booking before the tool is returned",
        ));
    }

    crate::validation::validate_rating(rating)?;

    if already_reviewed {
        return Err(CoreError::duplicate("Review", "booking"));
    }

    Ok(reviewee)
}

// =============================================================================
// Unit Tests
// =============================================================================
