//! # Listing Repository
//!
//! Database operations for rentable tools.
//!
//! ## Visibility
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert()            → is_approved = 0, visible only to owner/admin    │
//! │  set_approved(true)  → appears in recent(), discover(), cross_sell()   │
//! │                                                                         │
//! │  discover(search, location)                                            │
//! │  ├── search   : name or description LIKE %search% (ASCII case-folded)  │
//! │  ├── location : owner's profile pincode = location                     │
//! │  └── always   : is_approved = 1, newest first                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use agrirent_core::Listing;

const LISTING_COLUMNS: &str = r#"
    l.id, l.owner_id, l.name, l.category, l.description,
    l.price_per_day_paise, l.image, l.is_approved,
    l.available_from, l.available_to, l.created_at
"#;

/// Escapes LIKE wildcards so user input matches literally.
///
/// The term keeps its case: SQLite's LIKE folds ASCII letters itself and
/// compares everything else verbatim, so pre-folding here would break
/// non-ASCII names.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Repository for listing database operations.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    /// Creates a new ListingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ListingRepository { pool }
    }

    /// Inserts a listing as given; callers force `is_approved = false`.
    pub async fn insert(&self, listing: &Listing) -> DbResult<()> {
        debug!(id = %listing.id, owner_id = %listing.owner_id, "Inserting listing");

        sqlx::query(
            r#"
            INSERT INTO listings (
                id, owner_id, name, category, description,
                price_per_day_paise, image, is_approved,
                available_from, available_to, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&listing.id)
        .bind(&listing.owner_id)
        .bind(&listing.name)
        .bind(listing.category)
        .bind(&listing.description)
        .bind(listing.price_per_day_paise)
        .bind(&listing.image)
        .bind(listing.is_approved)
        .bind(listing.available_from)
        .bind(listing.available_to)
        .bind(listing.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a listing by ID regardless of approval.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = ?1");
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(listing)
    }

    /// Sets the administrator approval flag.
    pub async fn set_approved(&self, id: &str, approved: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE listings SET is_approved = ?2 WHERE id = ?1")
            .bind(id)
            .bind(approved)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Listing", id));
        }

        Ok(())
    }

    /// Filters approved listings by text and owner pincode.
    ///
    /// Empty `search` or `location` disables that filter.
    pub async fn discover(&self, search: &str, location: &str) -> DbResult<Vec<Listing>> {
        let search = search.trim();
        let location = location.trim();

        debug!(search, location, "Discovering listings");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {LISTING_COLUMNS} FROM listings l \
             JOIN profiles p ON p.account_id = l.owner_id \
             WHERE l.is_approved = 1"
        ));

        if !search.is_empty() {
            let pattern = like_pattern(search);
            qb.push(" AND (l.name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR l.description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if !location.is_empty() {
            qb.push(" AND p.pincode = ").push_bind(location.to_string());
        }

        qb.push(" ORDER BY l.created_at DESC, l.rowid DESC");

        let listings = qb.build_query_as::<Listing>().fetch_all(&self.pool).await?;
        Ok(listings)
    }

    /// Newest approved listings.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings l \
             WHERE l.is_approved = 1 \
             ORDER BY l.created_at DESC, l.rowid DESC LIMIT ?1"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Newest approved listings owned by someone other than `viewer_id`.
    pub async fn cross_sell(&self, viewer_id: &str, limit: i64) -> DbResult<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings l \
             WHERE l.is_approved = 1 AND l.owner_id <> ?1 \
             ORDER BY l.created_at DESC, l.rowid DESC LIMIT ?2"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(viewer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Listings owned by an account, newest first.
    pub async fn by_owner(&self, owner_id: &str, approved_only: bool) -> DbResult<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings l \
             WHERE l.owner_id = ?1 AND (?2 = 0 OR l.is_approved = 1) \
             ORDER BY l.created_at DESC, l.rowid DESC"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(owner_id)
            .bind(approved_only)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
