//! Account service.
//!
//! Registration, login/logout, public profiles, administrator verification
//! and the per-user dashboard.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use agrirent_core::validation::{
    validate_mobile_number, validate_password, validate_pincode, validate_place_name,
};
use agrirent_core::{Account, AccountPublic, Booking, Listing, Profile, Review, CROSS_SELL_LIMIT};
use agrirent_db::password::{hash_password_blocking_pool, verify_password_blocking_pool};
use agrirent_db::repository::generate_id;
use agrirent_db::DbError;

use crate::auth::{AuthUser, IssuedToken};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

// =============================================================================
// Requests & Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub village: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub pincode: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub account: AccountPublic,
    #[serde(flatten)]
    pub token: IssuedToken,
}

#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub account: AccountPublic,
    pub profile: Option<Profile>,
    /// Approved listings only.
    pub listings: Vec<Listing>,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub account: AccountPublic,
    pub profile: Option<Profile>,
    /// Bookings I made as a borrower.
    pub my_bookings: Vec<Booking>,
    /// My listings, approved or not.
    pub my_listings: Vec<Listing>,
    /// Bookings on my listings.
    pub incoming_requests: Vec<Booking>,
    /// Other farmers' tools.
    pub cross_sell: Vec<Listing>,
    pub pending_count: i64,
}

#[derive(Debug, Serialize)]
pub struct Notifications {
    pub pending_count: i64,
}

// =============================================================================
// Service
// =============================================================================

/// Account service implementation.
pub struct AccountService {
    state: Arc<AppState>,
}

impl AccountService {
    pub fn new(state: Arc<AppState>) -> Self {
        AccountService { state }
    }

    /// Creates an account with its profile and opens a session.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<SessionResponse> {
        let mobile = validate_mobile_number(&req.mobile_number)?;
        validate_password(&req.password, &req.confirm_password)?;
        let village = validate_place_name("village", &req.village)?;
        let district = validate_place_name("district", &req.district)?;
        let pincode = validate_pincode(&req.pincode)?;

        let account = Account {
            id: generate_id(),
            mobile_number: mobile,
            password_hash: hash_password_blocking_pool(req.password.clone()).await?,
            is_admin: false,
            created_at: Utc::now(),
        };
        let profile = Profile {
            account_id: account.id.clone(),
            village,
            district,
            pincode,
            is_verified: false,
        };

        self.state.db.accounts().create(&account, &profile).await?;
        info!(account_id = %account.id, "Account registered");

        let token = self.state.jwt.issue(&account)?;
        Ok(SessionResponse {
            account: account.to_public(),
            token,
        })
    }

    /// Exchanges credentials for a session token.
    pub async fn login(&self, req: LoginRequest) -> ApiResult<SessionResponse> {
        let invalid = || ApiError::unauthenticated("Invalid mobile number or password");

        let account = self
            .state
            .db
            .accounts()
            .get_by_mobile(req.mobile_number.trim())
            .await?
            .ok_or_else(invalid)?;

        let verified =
            verify_password_blocking_pool(req.password, account.password_hash.clone()).await?;
        if !verified {
            warn!(account_id = %account.id, "Failed login attempt");
            return Err(invalid());
        }

        let token = self.state.jwt.issue(&account)?;
        info!(account_id = %account.id, "Logged in");
        Ok(SessionResponse {
            account: account.to_public(),
            token,
        })
    }

    /// Revokes the caller's current token.
    pub async fn logout(&self, user: &AuthUser) -> ApiResult<()> {
        self.state
            .db
            .revoked_tokens()
            .revoke(&user.jti, &user.account_id, user.expires_at)
            .await?;
        info!(account_id = %user.account_id, "Logged out");
        Ok(())
    }

    pub async fn public_profile(&self, username: &str) -> ApiResult<PublicProfile> {
        let account = self.account_by_username(username).await?;
        let db = &self.state.db;

        Ok(PublicProfile {
            profile: db.accounts().get_profile(&account.id).await?,
            listings: db.listings().by_owner(&account.id, true).await?,
            reviews: db.reviews().list_for_reviewee(&account.id).await?,
            average_rating: db.reviews().average_rating(&account.id).await?,
            account: account.to_public(),
        })
    }

    /// Administrator marks a farmer's profile as verified.
    pub async fn verify_profile(&self, admin: &AuthUser, username: &str) -> ApiResult<Profile> {
        admin.require_admin(&self.state, "verify profiles").await?;

        let account = self.account_by_username(username).await?;
        self.state.db.accounts().set_verified(&account.id, true).await?;
        info!(account_id = %account.id, admin_id = %admin.account_id, "Profile verified");

        self.state
            .db
            .accounts()
            .get_profile(&account.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Profile", username))
    }

    pub async fn dashboard(&self, user: &AuthUser) -> ApiResult<Dashboard> {
        let db = &self.state.db;
        let account = db
            .accounts()
            .get_by_id(&user.account_id)
            .await?
            .ok_or_else(|| ApiError::unauthenticated("Account no longer exists"))?;

        Ok(Dashboard {
            profile: db.accounts().get_profile(&account.id).await?,
            my_bookings: db.bookings().list_for_borrower(&account.id).await?,
            my_listings: db.listings().by_owner(&account.id, false).await?,
            incoming_requests: db.bookings().list_incoming_for_owner(&account.id).await?,
            cross_sell: db.listings().cross_sell(&account.id, CROSS_SELL_LIMIT).await?,
            pending_count: db.bookings().count_pending_for_owner(&account.id).await?,
            account: account.to_public(),
        })
    }

    pub async fn notifications(&self, user: &AuthUser) -> ApiResult<Notifications> {
        let pending_count = self
            .state
            .db
            .bookings()
            .count_pending_for_owner(&user.account_id)
            .await?;
        Ok(Notifications { pending_count })
    }

    async fn account_by_username(&self, username: &str) -> ApiResult<Account> {
        self.state
            .db
            .accounts()
            .get_by_mobile(username.trim())
            .await?
            .ok_or_else(|| DbError::not_found("Account", username).into())
    }
}
