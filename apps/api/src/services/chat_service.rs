//! Booking chat.
//!
//! One append-only transcript per booking, open to its two parties only.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use agrirent_core::validation::validate_message_content;
use agrirent_core::{Booking, BookingParties, Message};
use agrirent_db::repository::generate_id;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::booking_service::BookingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatThread {
    pub booking: Booking,
    /// Oldest first.
    pub messages: Vec<Message>,
}

/// Chat service implementation.
pub struct ChatService {
    state: Arc<AppState>,
}

impl ChatService {
    pub fn new(state: Arc<AppState>) -> Self {
        ChatService { state }
    }

    pub async fn list_messages(&self, viewer: &AuthUser, booking_id: &str) -> ApiResult<ChatThread> {
        let (booking, listing) = BookingService::new(self.state.clone()).load(booking_id).await?;
        BookingParties::new(&booking.borrower_id, &listing.owner_id)
            .ensure_party(&viewer.account_id, "view this chat")?;

        let messages = self.state.db.messages().list_for_booking(&booking.id).await?;
        Ok(ChatThread { booking, messages })
    }

    pub async fn post_message(
        &self,
        sender: &AuthUser,
        booking_id: &str,
        req: PostMessageRequest,
    ) -> ApiResult<Message> {
        let (booking, listing) = BookingService::new(self.state.clone()).load(booking_id).await?;
        BookingParties::new(&booking.borrower_id, &listing.owner_id)
            .ensure_party(&sender.account_id, "post in this chat")?;

        let message = Message {
            id: generate_id(),
            booking_id: booking.id,
            sender_id: sender.account_id.clone(),
            content: validate_message_content(&req.content)?,
            created_at: Utc::now(),
        };

        self.state.db.messages().insert(&message).await?;
        info!(booking_id = %message.booking_id, sender_id = %message.sender_id, "Message posted");
        Ok(message)
    }
}
