//! # Validation Module
//!
//! Input validation for AgriRent forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (apps/api)                                     │
//! │  ├── Deserialization of JSON / multipart                               │
//! │  └── Closed enums parsed (category, action, stage)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field formats (mobile, pincode, dates)                            │
//! │  └── Lengths and ranges                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (rating, status)                                │
//! │  └── UNIQUE / foreign keys                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error names its field so the caller can flag it on the form.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::{Money, MAX_PAISE};
use crate::{MAX_MESSAGE_LENGTH, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

/// Trims, then enforces a 1..=max character length.
fn bounded_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(required(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(value.to_string())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a mobile number (the login handle).
///
/// ## Rules
/// - Digits only
/// - Exactly 10 digits
///
/// ## Example
/// ```rust
/// use agrirent_core::validation::validate_mobile_number;
///
/// assert!(validate_mobile_number("9876543210").is_ok());
/// assert!(validate_mobile_number("98765-43210").is_err());
/// assert!(validate_mobile_number("987654321").is_err());
/// ```
pub fn validate_mobile_number(mobile: &str) -> ValidationResult<String> {
    let mobile = mobile.trim();

    if mobile.is_empty() {
        return Err(required("mobile_number"));
    }

    if !mobile.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "mobile_number".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    if mobile.len() != 10 {
        return Err(ValidationError::InvalidFormat {
            field: "mobile_number".to_string(),
            reason: "must be exactly 10 digits".to_string(),
        });
    }

    Ok(mobile.to_string())
}

/// Validates a new password and its confirmation.
pub fn validate_password(password: &str, confirm: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if password != confirm {
        return Err(ValidationError::Mismatch {
            field: "confirm_password".to_string(),
            other: "password".to_string(),
        });
    }
    Ok(())
}

/// Validates a 6-digit postal code.
pub fn validate_pincode(pincode: &str) -> ValidationResult<String> {
    let pincode = pincode.trim();
    if pincode.is_empty() {
        return Err(required("pincode"));
    }
    if pincode.len() != 6 || !pincode.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "pincode".to_string(),
            reason: "must be exactly 6 digits".to_string(),
        });
    }
    Ok(pincode.to_string())
}

/// Validates a village or district name (1-100 chars).
pub fn validate_place_name(field: &str, value: &str) -> ValidationResult<String> {
    bounded_text(field, value, 100)
}

// =============================================================================
// Listing Validators
// =============================================================================

/// Validates a listing name (1-200 chars).
pub fn validate_listing_name(name: &str) -> ValidationResult<String> {
    bounded_text("name", name, 200)
}

/// Validates a listing description. Required, no upper bound beyond sanity.
pub fn validate_description(description: &str) -> ValidationResult<String> {
    bounded_text("description", description, 5000)
}

/// Validates a daily price.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must fit ten digits with two decimals
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price_per_day".to_string(),
        });
    }
    if price.paise() > MAX_PAISE {
        return Err(ValidationError::OutOfRange {
            field: "price_per_day".to_string(),
            min: 1,
            max: MAX_PAISE,
        });
    }
    Ok(())
}

/// Validates an availability window; both ends inclusive.
pub fn validate_availability(from: NaiveDate, to: NaiveDate) -> ValidationResult<()> {
    if to < from {
        return Err(ValidationError::InvalidFormat {
            field: "available_to".to_string(),
            reason: "must not be before available_from".to_string(),
        });
    }
    Ok(())
}

/// Validates a discovery search string.
///
/// ## Rules
/// - Can be empty (no text filter)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Booking / Feedback Validators
// =============================================================================

/// Parses a `YYYY-MM-DD` date field.
///
/// ## Example
/// ```rust
/// use agrirent_core::validation::parse_date;
///
/// assert!(parse_date("start_date", "2024-01-01").is_ok());
/// assert!(parse_date("start_date", "").is_err());
/// assert!(parse_date("start_date", "01/01/2024").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(required(field));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a date like 2024-01-31".to_string(),
    })
}

/// Validates a review rating.
pub fn validate_rating(rating: i64) -> ValidationResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(())
}

/// Validates chat message content.
pub fn validate_message_content(content: &str) -> ValidationResult<String> {
    bounded_text("content", content, MAX_MESSAGE_LENGTH)
}

/// Validates a report reason (1-200 chars).
pub fn validate_report_reason(reason: &str) -> ValidationResult<String> {
    bounded_text("reason", reason, 200)
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use agrirent_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mobile_number() {
        assert_eq!(validate_mobile_number(" 9876543210 ").unwrap(), "9876543210");
        assert!(matches!(
            validate_mobile_number(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_mobile_number("98765432101").is_err());
        assert!(validate_mobile_number("98765abcde").is_err());
        assert!(validate_mobile_number("+919876543").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough", "longenough").is_ok());
        assert!(matches!(
            validate_password("short", "short"),
            Err(ValidationError::TooShort { .. })
        ));
        let err = validate_password("longenough", "different1").unwrap_err();
        assert_eq!(err.field(), "confirm_password");
    }

    #[test]
    fn test_validate_pincode() {
        assert!(validate_pincode("411001").is_ok());
        assert!(validate_pincode("41100").is_err());
        assert!(validate_pincode("41100a").is_err());
    }

    #[test]
    fn test_text_lengths() {
        assert!(validate_listing_name("Mahindra 575").is_ok());
        assert!(validate_listing_name("   ").is_err());
        assert!(validate_listing_name(&"x".repeat(201)).is_err());
        assert!(validate_place_name("village", &"v".repeat(100)).is_ok());
        assert!(validate_report_reason(&"r".repeat(201)).is_err());
        assert!(validate_message_content(&"m".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
        assert_eq!(validate_message_content("  hello ").unwrap(), "hello");
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::from_rupees(1)).is_ok());
        assert!(validate_price(Money::zero()).is_err());
        assert!(validate_price(Money::from_paise(-1)).is_err());
        assert!(validate_price(Money::from_paise(MAX_PAISE + 1)).is_err());
    }

    #[test]
    fn test_dates() {
        let from = parse_date("available_from", "2024-03-01").unwrap();
        let to = parse_date("available_to", "2024-03-31").unwrap();
        assert!(validate_availability(from, to).is_ok());
        assert!(validate_availability(from, from).is_ok());
        assert!(validate_availability(to, from).is_err());
        assert!(parse_date("start_date", "2024-02-30").is_err());
    }

    #[test]
    fn test_validate_rating() {
        for ok in 1..=5 {
            assert!(validate_rating(ok).is_ok());
        }
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("nope").is_err());
    }
}
