//! Listing service.
//!
//! ```text
//! submit_listing ──► is_approved = false ──► approve_listing (admin)
//!                                                   │
//!                                                   ▼
//!                                 recent / discover / public detail
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use agrirent_core::validation::{
    parse_date, validate_availability, validate_description, validate_listing_name,
    validate_price, validate_search_query,
};
use agrirent_core::{
    AccountPublic, Listing, Money, Profile, ToolCategory, ValidationError, RECENT_LISTINGS_LIMIT,
};
use agrirent_db::repository::generate_id;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::media::{MediaKind, UploadForm};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DiscoveryQuery {
    #[serde(default)]
    pub search: String,
    /// Owner pincode.
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct Discovery {
    pub search: String,
    pub location: String,
    pub listings: Vec<Listing>,
}

#[derive(Debug, Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub owner: AccountPublic,
    pub owner_profile: Option<Profile>,
    pub owner_rating: Option<f64>,
}

/// Listing service implementation.
pub struct ListingService {
    state: Arc<AppState>,
}

impl ListingService {
    pub fn new(state: Arc<AppState>) -> Self {
        ListingService { state }
    }

    /// Creates a listing from the `/add-tool/` form.
    ///
    /// The owner is always the caller and approval always starts false,
    /// whatever the form says.
    pub async fn submit_listing(&self, owner: &AuthUser, mut form: UploadForm) -> ApiResult<Listing> {
        let name = validate_listing_name(form.text("name"))?;
        let category: ToolCategory = form.text("category").parse()?;
        let description = validate_description(form.text("description"))?;
        let price = Money::parse_decimal("price_per_day", form.text("price_per_day"))?;
        validate_price(price)?;
        let available_from = parse_date("available_from", form.text("available_from"))?;
        let available_to = parse_date("available_to", form.text("available_to"))?;
        validate_availability(available_from, available_to)?;

        let image = match form.take_file("image") {
            Some(file) => Some(self.state.media.save(MediaKind::ToolImage, &file).await?),
            None => None,
        };

        let listing = Listing {
            id: generate_id(),
            owner_id: owner.account_id.clone(),
            name,
            category,
            description,
            price_per_day_paise: price.paise(),
            image,
            is_approved: false,
            available_from,
            available_to,
            created_at: Utc::now(),
        };

        if let Err(e) = self.state.db.listings().insert(&listing).await {
            if let Some(path) = &listing.image {
                self.state.media.remove(path).await;
            }
            return Err(e.into());
        }

        info!(
            listing_id = %listing.id,
            owner_id = %listing.owner_id,
            category = %listing.category,
            "Listing submitted for approval"
        );
        Ok(listing)
    }

    /// Administrator makes a listing publicly visible.
    pub async fn approve_listing(&self, admin: &AuthUser, listing_id: &str) -> ApiResult<Listing> {
        admin.require_admin(&self.state, "approve listings").await?;

        self.state.db.listings().set_approved(listing_id, true).await?;
        info!(listing_id, admin_id = %admin.account_id, "Listing approved");

        self.state
            .db
            .listings()
            .get_by_id(listing_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Listing", listing_id))
    }

    /// Public detail view.
    ///
    /// Unapproved listings exist only for their owner and administrators;
    /// everyone else gets the same answer as for a missing id.
    pub async fn get_listing(&self, viewer: Option<&AuthUser>, listing_id: &str) -> ApiResult<ListingDetail> {
        let db = &self.state.db;
        let listing = db
            .listings()
            .get_by_id(listing_id)
            .await?
            .filter(|l| {
                l.is_approved
                    || viewer.is_some_and(|v| v.is_admin || v.account_id == l.owner_id)
            })
            .ok_or_else(|| ApiError::not_found("Listing", listing_id))?;

        let owner = db
            .accounts()
            .get_by_id(&listing.owner_id)
            .await?
            .ok_or_else(|| ApiError::internal(format!("listing {} has no owner", listing.id)))?;

        Ok(ListingDetail {
            owner_profile: db.accounts().get_profile(&owner.id).await?,
            owner_rating: db.reviews().average_rating(&owner.id).await?,
            owner: owner.to_public(),
            listing,
        })
    }

    pub async fn discover(&self, query: DiscoveryQuery) -> ApiResult<Discovery> {
        let search = validate_search_query(&query.search)?;
        let location = query.location.trim().to_string();
        if location.chars().count() > 100 {
            return Err(ValidationError::TooLong {
                field: "location".to_string(),
                max: 100,
            }
            .into());
        }

        let listings = self.state.db.listings().discover(&search, &location).await?;
        Ok(Discovery {
            search,
            location,
            listings,
        })
    }

    /// Home page slice.
    pub async fn recent(&self) -> ApiResult<Vec<Listing>> {
        Ok(self.state.db.listings().recent(RECENT_LISTINGS_LIMIT).await?)
    }
}
