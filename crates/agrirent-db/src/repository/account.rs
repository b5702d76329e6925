//! # Account Repository
//!
//! Accounts and their one-to-one farmer profiles.
//!
//! An account and its profile are always written together in one
//! transaction, so a profile-less account never exists.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use agrirent_core::{Account, Profile};

/// Repository for account and profile operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts an account and its profile atomically.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - mobile number already registered
    pub async fn create(&self, account: &Account, profile: &Profile) -> DbResult<()> {
        debug!(id = %account.id, "Creating account");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, mobile_number, password_hash, is_admin, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.mobile_number)
        .bind(&account.password_hash)
        .bind(account.is_admin)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::duplicate("mobile_number", account.mobile_number.clone())
            }
            other => other,
        })?;

        sqlx::query(
            r#"
            INSERT INTO profiles (account_id, village, district, pincode, is_verified)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&account.id)
        .bind(&profile.village)
        .bind(&profile.district)
        .bind(&profile.pincode)
        .bind(profile.is_verified)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets an account by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, mobile_number, password_hash, is_admin, created_at
            FROM accounts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets an account by its mobile number (login handle / username).
    pub async fn get_by_mobile(&self, mobile_number: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, mobile_number, password_hash, is_admin, created_at
            FROM accounts
            WHERE mobile_number = ?1
            "#,
        )
        .bind(mobile_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets the profile belonging to an account.
    pub async fn get_profile(&self, account_id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT account_id, village, district, pincode, is_verified
            FROM profiles
            WHERE account_id = ?1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Sets the administrator-controlled verification flag.
    pub async fn set_verified(&self, account_id: &str, verified: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE profiles SET is_verified = ?2 WHERE account_id = ?1")
            .bind(account_id)
            .bind(verified)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Profile", account_id));
        }

        Ok(())
    }

    /// Grants administrator rights (used by the seed binary).
    pub async fn set_admin(&self, account_id: &str, is_admin: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE accounts SET is_admin = ?2 WHERE id = ?1")
            .bind(account_id)
            .bind(is_admin)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", account_id));
        }

        Ok(())
    }

    /// Counts registered accounts (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{db, farmer};

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = db().await;
        let account = farmer(&db, "9876543210", "411001").await;

        let by_mobile = db.accounts().get_by_mobile("9876543210").await.unwrap().unwrap();
        assert_eq!(by_mobile.id, account.id);
        assert!(!by_mobile.is_admin);

        let profile = db.accounts().get_profile(&account.id).await.unwrap().unwrap();
        assert_eq!(profile.pincode, "411001");
        assert!(!profile.is_verified);
    }

    #[tokio::test]
    async fn test_duplicate_mobile_rejected_and_nothing_written() {
        let db = db().await;
        farmer(&db, "9876543210", "411001").await;

        let mut clash = db.accounts().get_by_mobile("9876543210").await.unwrap().unwrap();
        clash.id = crate::repository::generate_id();
        let profile = Profile {
            account_id: clash.id.clone(),
            village: "v".into(),
            district: "d".into(),
            pincode: "411002".into(),
            is_verified: false,
        };

        let err = db.accounts().create(&clash, &profile).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "mobile_number"));
        assert_eq!(db.accounts().count().await.unwrap(), 1);
        assert!(db.accounts().get_profile(&clash.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_verified() {
        let db = db().await;
        let account = farmer(&db, "9876543210", "411001").await;

        db.accounts().set_verified(&account.id, true).await.unwrap();
        let profile = db.accounts().get_profile(&account.id).await.unwrap().unwrap();
        assert!(profile.is_verified);

        let err = db.accounts().set_verified("missing", true).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
