//! Booking service.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  borrower: POST /tool/{id}/          → pending   (total frozen)         │
//! │  owner:    POST /booking/{id}/approve/ → approved                       │
//! │            POST /booking/{id}/reject/  → rejected  (terminal)           │
//! │  borrower: POST /booking/{id}/proof/  stage=pickup → picked_up          │
//! │            POST /booking/{id}/proof/  stage=return → returned           │
//! │  either:   POST /booking/{id}/review/ → one review, returned only       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule is checked by `agrirent_core::booking` first; the write then
//! goes through the repository's compare-and-set so a concurrent change
//! surfaces as a conflict instead of being overwritten.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use agrirent_core::booking::{plan_decision, plan_handover, plan_review, quote_total};
use agrirent_core::validation::parse_date;
use agrirent_core::{
    Booking, BookingParties, BookingStatus, HandoverStage, Listing, OwnerDecision, Review,
};
use agrirent_db::repository::generate_id;
use agrirent_db::{BookingTransition, DbError};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::media::{MediaKind, UploadForm};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub delivery_requested: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// Missing counts as out of range.
    #[serde(default)]
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

/// Booking service implementation.
pub struct BookingService {
    state: Arc<AppState>,
}

impl BookingService {
    pub fn new(state: Arc<AppState>) -> Self {
        BookingService { state }
    }

    /// Requests a rental of an approved listing.
    pub async fn create_booking(
        &self,
        borrower: &AuthUser,
        listing_id: &str,
        req: CreateBookingRequest,
    ) -> ApiResult<Booking> {
        let listing = self
            .state
            .db
            .listings()
            .get_by_id(listing_id)
            .await?
            .filter(|l| l.is_approved)
            .ok_or_else(|| ApiError::not_found("Listing", listing_id))?;

        let start_date = parse_date("start_date", &req.start_date)?;
        let end_date = parse_date("end_date", &req.end_date)?;
        let total = quote_total(listing.price_per_day(), start_date, end_date)?;

        let now = Utc::now();
        let booking = Booking {
            id: generate_id(),
            listing_id: listing.id.clone(),
            borrower_id: borrower.account_id.clone(),
            start_date,
            end_date,
            status: BookingStatus::Pending,
            total_price_paise: total.paise(),
            delivery_requested: req.delivery_requested,
            delivery_fee_paise: 0,
            pickup_proof: None,
            return_proof: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        self.state.db.bookings().insert(&booking).await?;
        info!(
            booking_id = %booking.id,
            listing_id = %listing.id,
            borrower_id = %booking.borrower_id,
            total = %total,
            "Booking requested"
        );
        Ok(booking)
    }

    /// Owner approves or rejects a pending request.
    pub async fn decide(&self, actor: &AuthUser, booking_id: &str, action: &str) -> ApiResult<Booking> {
        let decision: OwnerDecision = action.parse()?;
        let (booking, listing) = self.load(booking_id).await?;

        let parties = BookingParties::new(&booking.borrower_id, &listing.owner_id);
        let next = plan_decision(booking.status, &parties, &actor.account_id, decision)?;

        let updated = self
            .state
            .db
            .bookings()
            .transition(&booking.id, &BookingTransition::new(&booking, next))
            .await?;

        info!(booking_id = %updated.id, status = %updated.status, "Booking decided");
        Ok(updated)
    }

    /// Borrower documents a pickup or return with a photo.
    ///
    /// The stage is checked before the file is written, and the file is
    /// removed again if the guarded update does not land.
    pub async fn record_handover(
        &self,
        actor: &AuthUser,
        booking_id: &str,
        mut form: UploadForm,
    ) -> ApiResult<Booking> {
        let stage: HandoverStage = form.text("stage").parse()?;
        let image = form.take_file("proof_image");
        let (booking, listing) = self.load(booking_id).await?;

        let parties = BookingParties::new(&booking.borrower_id, &listing.owner_id);
        let next = plan_handover(booking.status, &parties, &actor.account_id, stage, image.is_some())?;

        let Some(image) = image else {
            // plan_handover already rejects a missing image
            return Err(ApiError::internal("proof image vanished after planning"));
        };
        let path = self.state.media.save(MediaKind::Proof, &image).await?;

        let change = BookingTransition::new(&booking, next);
        let change = match stage {
            HandoverStage::Pickup => change.with_pickup_proof(&path),
            HandoverStage::Return => change.with_return_proof(&path),
        };

        match self.state.db.bookings().transition(&booking.id, &change).await {
            Ok(updated) => {
                info!(
                    booking_id = %updated.id,
                    stage = stage.as_str(),
                    status = %updated.status,
                    "Handover recorded"
                );
                Ok(updated)
            }
            Err(e) => {
                self.state.media.remove(&path).await;
                Err(e.into())
            }
        }
    }

    /// Either party reviews the other once the tool is back.
    pub async fn leave_review(
        &self,
        actor: &AuthUser,
        booking_id: &str,
        req: ReviewRequest,
    ) -> ApiResult<Review> {
        let (booking, listing) = self.load(booking_id).await?;
        let already_reviewed = self.state.db.reviews().exists_for_booking(&booking.id).await?;

        let parties = BookingParties::new(&booking.borrower_id, &listing.owner_id);
        let reviewee = plan_review(
            booking.status,
            &parties,
            &actor.account_id,
            req.rating,
            already_reviewed,
        )?;

        let review = Review {
            id: generate_id(),
            booking_id: booking.id.clone(),
            reviewer_id: actor.account_id.clone(),
            reviewee_id: reviewee.to_string(),
            rating: req.rating,
            comment: req.comment.trim().to_string(),
            created_at: Utc::now(),
        };

        // The UNIQUE index settles a race between two first reviews
        self.state.db.reviews().insert(&review).await?;
        info!(booking_id = %booking.id, rating = review.rating, "Review left");
        Ok(review)
    }

    /// Loads a booking together with its listing (for the owner id).
    pub(crate) async fn load(&self, booking_id: &str) -> ApiResult<(Booking, Listing)> {
        let db = &self.state.db;
        let booking = db
            .bookings()
            .get_by_id(booking_id)
            .await?
            .ok_or_else(|| DbError::not_found("Booking", booking_id))?;
        let listing = db
            .listings()
            .get_by_id(&booking.listing_id)
            .await?
            .ok_or_else(|| DbError::not_found("Listing", &booking.listing_id))?;
        Ok((booking, listing))
    }
}
