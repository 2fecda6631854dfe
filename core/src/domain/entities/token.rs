//! Token entities for JWT-based authentication.
//!
//! Access tokens are stateless. Every refresh token is backed by one
//! [`RefreshTokenRecord`] in the ledger whose id is the token's `jti` and
//! whose `updated_at` equals the `iat` of the most recently issued token for
//! that id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pb_shared::utils::timestamp::from_epoch_seconds;

/// Claims of an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: i64,

    /// Issued at, epoch seconds
    pub iat: i64,

    /// Expiration, epoch seconds
    pub exp: i64,
}

/// Claims of a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user ID)
    pub sub: i64,

    /// Ledger record id
    pub jti: i64,

    /// Issued at, epoch seconds; must match the record's `updated_at`
    pub iat: i64,

    /// Expiration, epoch seconds
    pub exp: i64,
}

impl RefreshClaims {
    /// `iat` as a timestamp
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        from_epoch_seconds(self.iat)
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}

/// Derived state of a ledger record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

/// Refresh token ledger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    /// Record id, embedded as `jti`
    pub id: i64,

    /// Owner of the token
    pub user_id: i64,

    /// Set once on revocation, never changed afterwards
    pub revoked_at: Option<DateTime<Utc>>,

    /// Absolute expiry, moved forward on each rotation
    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    /// `iat` of the latest token issued for this record
    pub updated_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Whether the record has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the record is past its expiry at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Revocation takes precedence over expiry
    pub fn state(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.is_revoked() {
            RefreshTokenState::Revoked
        } else if self.is_expired(now) {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Data for inserting a fresh ledger record
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: i64,

    /// Becomes both `created_at` and `updated_at`
    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}
