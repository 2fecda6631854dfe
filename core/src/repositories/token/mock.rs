//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{NewRefreshToken, RefreshTokenRecord};
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Mock token repository for testing
///
/// Clones share the same storage.
#[derive(Clone)]
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<i64, RefreshTokenRecord>>>,
    next_id: Arc<AtomicI64>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether the ledger is empty
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn insert_refresh_token(
        &self,
        token: NewRefreshToken,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = RefreshTokenRecord {
            id,
            user_id: token.user_id,
            revoked_at: None,
            expires_at: token.expires_at,
            created_at: token.issued_at,
            updated_at: token.issued_at,
        };

        self.tokens.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&id).cloned())
    }

    async fn rotate(
        &self,
        id: i64,
        expected_updated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&id) {
            Some(record)
                if record.revoked_at.is_none() && record.updated_at == expected_updated_at =>
            {
                record.expires_at = expires_at;
                record.updated_at = updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(&self, id: i64, revoked_at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&id) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(revoked_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        revoked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for record in tokens.values_mut() {
            if record.user_id == user_id && record.revoked_at.is_none() {
                record.revoked_at = Some(revoked_at);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, record| record.expires_at >= cutoff);

        Ok((initial_count - tokens.len()) as u64)
    }
}
