//! # Review Repository
//!
//! Post-rental feedback. The `booking_id` column is UNIQUE, so the second
//! review for a booking fails even if two requests race past the engine.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use agrirent_core::Review;

/// Repository for review operations.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    /// Creates a new ReviewRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Inserts a review.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the booking already has a review
    pub async fn insert(&self, review: &Review) -> DbResult<()> {
        debug!(booking_id = %review.booking_id, rating = review.rating, "Inserting review");

        sqlx::query(
            r#"
            INSERT INTO reviews (id, booking_id, reviewer_id, reviewee_id, rating, comment, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&review.id)
        .bind(&review.booking_id)
        .bind(&review.reviewer_id)
        .bind(&review.reviewee_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("booking", review.booking_id.clone()),
            other => other,
        })?;

        Ok(())
    }

    /// Whether a booking already has its review.
    pub async fn exists_for_booking(&self, booking_id: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE booking_id = ?1)")
                .bind(booking_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Reviews received by an account, newest first.
    pub async fn list_for_reviewee(&self, reviewee_id: &str) -> DbResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, booking_id, reviewer_id, reviewee_id, rating, comment, created_at
            FROM reviews
            WHERE reviewee_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(reviewee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Mean rating received, `None` when there are no reviews.
    pub async fn average_rating(&self, reviewee_id: &str) -> DbResult<Option<f64>> {
        let avg: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating) FROM reviews WHERE reviewee_id = ?1")
                .bind(reviewee_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(avg)
    }
}
