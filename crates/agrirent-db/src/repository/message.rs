//! # Message Repository
//!
//! Append-only chat transcript per booking. There is no update or delete.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use agrirent_core::Message;

/// Repository for booking chat messages.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Creates a new MessageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MessageRepository { pool }
    }

    /// Appends a message.
    pub async fn insert(&self, message: &Message) -> DbResult<()> {
        debug!(booking_id = %message.booking_id, sender_id = %message.sender_id, "Appending message");

        sqlx::query(
            r#"
            INSERT INTO messages (id, booking_id, sender_id, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&message.id)
        .bind(&message.booking_id)
        .bind(&message.sender_id)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Messages of a booking, oldest first; ties keep insertion order.
    pub async fn list_for_booking(&self, booking_id: &str) -> DbResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, booking_id, sender_id, content, created_at
            FROM messages
            WHERE booking_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
