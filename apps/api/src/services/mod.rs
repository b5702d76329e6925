//! Service layer.
//!
//! Each service wraps the shared [`AppState`](crate::AppState) and turns one
//! HTTP use case into repository calls, with the permission and state rules
//! taken from `agrirent_core`. Handlers in [`crate::routes`] stay thin.

pub mod account_service;
pub mod booking_service;
pub mod chat_service;
pub mod listing_service;
pub mod report_service;
