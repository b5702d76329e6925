//! HTTP routes.
//!
//! One module per area; each exposes `routes()` and the handlers it
//! mounts. Handlers only extract, call a service and wrap the result.

use agrirent_core::validation::validate_uuid;

use crate::error::ApiResult;

pub mod accounts;
pub mod admin;
pub mod bookings;
pub mod chat;
pub mod listings;
pub mod pages;
pub mod reports;

/// Rejects path ids that cannot name a row before touching the database.
fn path_id(id: &str) -> ApiResult<&str> {
    validate_uuid(id)?;
    Ok(id)
}
