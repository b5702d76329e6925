//! # Domain Types
//!
//! Core domain types used throughout AgriRent.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Account      │   │    Listing      │   │    Booking      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  owner_id (FK)  │◄──│  listing_id     │       │
//! │  │  mobile_number  │   │  category       │   │  borrower_id    │       │
//! │  │  Profile (1:1)  │   │  price_per_day  │   │  status         │       │
//! │  └─────────────────┘   │  is_approved    │   │  total_price    │       │
//! │                        └────────▲────────┘   └────────▲────────┘       │
//! │                                 │                     │                 │
//! │                        ┌────────┴────────┐   ┌────────┴────────┐       │
//! │                        │     Report      │   │ Message, Review │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business handle: the mobile number is both login and public username

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Account & Profile
// =============================================================================

/// A registered farmer (or administrator).
///
/// Never serialized to clients directly: it carries the password hash.
/// Use [`AccountPublic`] for responses.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    pub id: String,
    /// 10-digit mobile number; login handle and public username.
    pub mobile_number: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Strips the credential for display.
    pub fn to_public(&self) -> AccountPublic {
        AccountPublic {
            id: self.id.clone(),
            username: self.mobile_number.clone(),
            created_at: self.created_at,
        }
    }
}

/// Credential-free view of an account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountPublic {
    pub id: String,
    pub username: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Farmer-specific attributes, one-to-one with [`Account`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    pub account_id: String,
    pub village: String,
    pub district: String,
    /// 6-digit postal code, used by discovery's location filter.
    pub pincode: String,
    /// Set by an administrator only.
    pub is_verified: bool,
}

// =============================================================================
// Tool Category
// =============================================================================

/// Closed set of listing categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Tractor,
    /// Plow / tillage equipment.
    Plow,
    Harvester,
    /// Irrigation tools.
    Irrigation,
    Other,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 5] = [
        ToolCategory::Tractor,
        ToolCategory::Plow,
        ToolCategory::Harvester,
        ToolCategory::Irrigation,
        ToolCategory::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Tractor => "tractor",
            ToolCategory::Plow => "plow",
            ToolCategory::Harvester => "harvester",
            ToolCategory::Irrigation => "irrigation",
            ToolCategory::Other => "other",
        }
    }

    /// Human label shown in listing forms.
    pub const fn label(&self) -> &'static str {
        match self {
            ToolCategory::Tractor => "Tractor",
            ToolCategory::Plow => "Plow/Tillage",
            ToolCategory::Harvester => "Harvester",
            ToolCategory::Irrigation => "Irrigation Tools",
            ToolCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        ToolCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "category".to_string(),
                allowed: ToolCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Listing
// =============================================================================

/// A tool offered for rent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Listing {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub category: ToolCategory,
    pub description: String,
    /// Daily rent in paise.
    pub price_per_day_paise: i64,
    /// Relative path of the stored image, if any.
    pub image: Option<String>,
    /// Administrator gate for public visibility.
    pub is_approved: bool,
    #[ts(as = "String")]
    pub available_from: NaiveDate,
    #[ts(as = "String")]
    pub available_to: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Returns the daily price as Money.
    #[inline]
    pub fn price_per_day(&self) -> Money {
        Money::from_paise(self.price_per_day_paise)
    }
}

// =============================================================================
// Booking Status
// =============================================================================

/// Lifecycle of a rental request.
///
/// ```text
/// pending ──► approved ──► picked_up ──► returned
///    │
///    └──────► rejected
/// ```
///
/// The edges themselves live in [`crate::booking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    PickedUp,
    Returned,
}

impl BookingStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::PickedUp => "picked_up",
            BookingStatus::Returned => "returned",
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Booking
// =============================================================================

/// A rental transaction between a borrower and a listing's owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Booking {
    pub id: String,
    pub listing_id: String,
    pub borrower_id: String,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    /// price_per_day × days, frozen at creation.
    pub total_price_paise: i64,
    pub delivery_requested: bool,
    pub delivery_fee_paise: i64,
    pub pickup_proof: Option<String>,
    pub return_proof: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Incremented by every transition; guards concurrent writers.
    pub version: i64,
}

// =============================================================================
// Message
// =============================================================================

/// One line of a booking's chat transcript. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Message {
    pub id: String,
    pub booking_id: String,
    pub sender_id: String,
    pub content: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Review
// =============================================================================

/// Post-rental feedback; at most one per booking.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    /// 1 to 5 inclusive.
    pub rating: i64,
    pub comment: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Report
// =============================================================================

/// A complaint filed against a listing. Append-only, no status.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Report {
    pub id: String,
    pub listing_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
