//! Token repository trait defining the interface for the refresh token ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::{NewRefreshToken, RefreshTokenRecord};
use crate::errors::DomainError;

/// Repository trait for the refresh token ledger
///
/// One record backs every issued refresh token. Records are inserted on
/// login or registration, rotated in place on refresh, revoked on logout and
/// only physically removed by [`purge_stale`](TokenRepository::purge_stale).
///
/// Timestamps have whole-second precision.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a new record with `created_at = updated_at = issued_at`
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The stored record including its generated id
    /// * `Err(DomainError)` - Storage failure
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use pb_core::repositories::TokenRepository;
    /// # use pb_core::domain::entities::token::NewRefreshToken;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let now = Utc::now();
    /// let record = repo
    ///     .insert_refresh_token(NewRefreshToken {
    ///         user_id: 1,
    ///         issued_at: now,
    ///         expires_at: now + Duration::hours(24),
    ///     })
    ///     .await?;
    /// println!("jti = {}", record.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn insert_refresh_token(
        &self,
        token: NewRefreshToken,
    ) -> Result<RefreshTokenRecord, DomainError>;

    /// Find a record by id (`jti`)
    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Move a record forward to a newly issued token
    ///
    /// Applies only while the record is unrevoked and its `updated_at` still
    /// equals `expected_updated_at`, so of two concurrent rotations of the
    /// same token at most one succeeds.
    ///
    /// # Returns
    /// * `Ok(true)` - The record was rotated
    /// * `Ok(false)` - The record was missing, revoked, or already rotated
    async fn rotate(
        &self,
        id: i64,
        expected_updated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Set `revoked_at` on an unrevoked record
    ///
    /// # Returns
    /// * `Ok(true)` - The record was revoked by this call
    /// * `Ok(false)` - The record was missing or already revoked
    async fn revoke(&self, id: i64, revoked_at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Set `revoked_at` on every unrevoked record of a user
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records revoked
    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        revoked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Delete records whose `expires_at` is before `cutoff`
    ///
    /// Revocation alone never makes a record eligible; a revoked record stays
    /// until the tokens signed for it have expired.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records deleted
    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
