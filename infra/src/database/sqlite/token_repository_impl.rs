//! SQLite implementation of the TokenRepository trait.
//!
//! Every state change is a single conditional statement, so rotation and
//! revocation stay correct when several requests race on the same record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use pb_core::domain::entities::token::{NewRefreshToken, RefreshTokenRecord};
use pb_core::errors::DomainError;
use pb_core::repositories::TokenRepository;
use pb_shared::utils::timestamp::format_db_timestamp;

use super::{get_column, get_optional_timestamp, get_timestamp, query_error};

const SELECT_COLUMNS: &str =
    "SELECT id, userId, revokedAt, expiresAt, createdAt, updatedAt FROM refresh_tokens";

/// SQLite implementation of TokenRepository
#[derive(Clone)]
pub struct SqliteTokenRepository {
    /// Database connection pool
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    /// Create a new SQLite token repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &SqliteRow) -> Result<RefreshTokenRecord, DomainError> {
        Ok(RefreshTokenRecord {
            id: get_column(row, "id")?,
            user_id: get_column(row, "userId")?,
            revoked_at: get_optional_timestamp(row, "revokedAt")?,
            expires_at: get_timestamp(row, "expiresAt")?,
            created_at: get_timestamp(row, "createdAt")?,
            updated_at: get_timestamp(row, "updatedAt")?,
        })
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn insert_refresh_token(
        &self,
        token: NewRefreshToken,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let issued_at = format_db_timestamp(token.issued_at);

        let query = r#"
            INSERT INTO refresh_tokens (userId, revokedAt, expiresAt, createdAt, updatedAt)
            VALUES (?, NULL, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(token.user_id)
            .bind(format_db_timestamp(token.expires_at))
            .bind(&issued_at)
            .bind(&issued_at)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("insert refresh token", e))?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::internal("Inserted refresh token is missing"))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find refresh token", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn rotate(
        &self,
        id: i64,
        expected_updated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET expiresAt = ?, updatedAt = ?
            WHERE id = ? AND updatedAt = ? AND revokedAt IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(format_db_timestamp(expires_at))
            .bind(format_db_timestamp(updated_at))
            .bind(id)
            .bind(format_db_timestamp(expected_updated_at))
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("rotate refresh token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke(&self, id: i64, revoked_at: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revokedAt = ?
            WHERE id = ? AND revokedAt IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(format_db_timestamp(revoked_at))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("revoke refresh token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        revoked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revokedAt = ?
            WHERE userId = ? AND revokedAt IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(format_db_timestamp(revoked_at))
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("revoke refresh tokens of user", e))?;

        Ok(result.rows_affected())
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let cutoff = format_db_timestamp(cutoff);

        let query = "DELETE FROM refresh_tokens WHERE expiresAt < ?";

        let result = sqlx::query(query)
            .bind(&cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("purge stale refresh tokens", e))?;

        Ok(result.rows_affected())
    }
}
