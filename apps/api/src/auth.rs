//! JWT authentication module.
//!
//! Issues session tokens at login/registration, validates them on every
//! authenticated request and honours logout through a revocation table.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! AuthUser extractor ── decode + exp check ── jti revoked? ──► handler
//!        │                     │                   │
//!        └── no header ────────┴── invalid ────────┴──► 401 UNAUTHENTICATED
//! ```

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agrirent_core::Account;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,

    /// Mobile number, doubling as the public username
    pub mobile: String,

    pub is_admin: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID, recorded on logout
    pub jti: String,
}

/// A freshly issued session token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Generate a session token for an account.
    pub fn issue(&self, account: &Account) -> ApiResult<IssuedToken> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: account.id.clone(),
            mobile: account.mobile_number.clone(),
            is_admin: account.is_admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer",
            expires_at: exp,
        })
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> ApiResult<Claims> {
        let token_data: TokenData<Claims> = decode(token, &self.decoding, &Validation::default())
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                ApiError::unauthenticated("Invalid or expired session token")
            })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: String,
    pub mobile: String,
    pub is_admin: bool,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthUser {
    /// Gate for the `/admin/` routes.
    ///
    /// Reads the flag from the account row, not the token, so a demotion
    /// takes effect on the next request.
    pub async fn require_admin(&self, state: &AppState, action: &str) -> ApiResult<()> {
        let is_admin = state
            .db
            .accounts()
            .get_by_id(&self.account_id)
            .await?
            .is_some_and(|account| account.is_admin);
        if is_admin {
            Ok(())
        } else {
            tracing::warn!(account_id = %self.account_id, action, "Non-admin attempted admin action");
            Err(agrirent_core::CoreError::denied(action).into())
        }
    }

    async fn from_token(state: &AppState, token: &str) -> ApiResult<Self> {
        let claims = state.jwt.validate(token)?;

        if state.db.revoked_tokens().is_revoked(&claims.jti).await? {
            return Err(ApiError::unauthenticated("Session has been logged out"));
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| ApiError::unauthenticated("Invalid token expiry"))?;

        Ok(AuthUser {
            account_id: claims.sub,
            mobile: claims.mobile,
            is_admin: claims.is_admin,
            jti: claims.jti,
            expires_at,
        })
    }
}

fn bearer_from_parts(parts: &Parts) -> ApiResult<Option<&str>> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Malformed Authorization header"))?;
    extract_bearer_token(value)
        .map(Some)
        .ok_or_else(|| ApiError::unauthenticated("Expected a Bearer token"))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_from_parts(parts)?
            .ok_or_else(|| ApiError::unauthenticated("Login required"))?;
        AuthUser::from_token(state, token).await
    }
}

/// Optional authentication: anonymous callers get `None`, but a token
/// that is present and invalid still fails the request.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_from_parts(parts)? {
            Some(token) => Ok(MaybeAuthUser(Some(AuthUser::from_token(state, token).await?))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
