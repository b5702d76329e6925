//! # Database Errors
//!
//! ```text
//! sqlx::Error ──From──► DbError ──From──► ApiError (apps/api)
//!                          │
//!                          ├── constraint kinds become typed variants
//!                          └── everything else keeps only its message
//! ```
//!
//! Repositories that know the business meaning of a constraint (a taken
//! mobile number, a second review) replace the generic variant with a
//! specific one before returning.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("No {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write.
    #[error("{field} {value} is already taken")]
    UniqueViolation { field: String, value: String },

    /// The row references something that does not exist.
    #[error("Dangling reference: {message}")]
    ForeignKeyViolation { message: String },

    /// A guarded update matched no row: the record moved on since it was read.
    ///
    /// ## When This Occurs
    /// - Owner approves while another request already rejected
    /// - Two proof uploads race on one booking
    #[error("{entity} {id} changed concurrently")]
    Conflict { entity: String, id: String },

    #[error("Cannot reach database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration error: {0}")]
    MigrationFailed(String),

    /// Any other database-reported failure (syntax, CHECK, ...).
    #[error("Statement rejected: {0}")]
    QueryFailed(String),

    #[error("Timed out waiting for a pooled connection")]
    PoolExhausted,

    #[error("Database driver error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// A uniqueness failure with the business field and value filled in.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        // SQLite reports "UNIQUE constraint failed: table.column"
                        field: message
                            .rsplit(": ")
                            .next()
                            .unwrap_or("unknown")
                            .to_string(),
                        value: "unknown".to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    _ => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
