//! Mock implementation of UserRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::{NewUser, User, UserCredentials};
use crate::errors::{ConflictError, DomainError};

use super::trait_::UserRepository;

/// Mock user repository for testing
///
/// Clones share the same storage.
#[derive(Clone)]
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<i64, UserCredentials>>>,
    next_id: Arc<AtomicI64>,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Remove a user, as if the account had been deleted
    pub async fn remove(&self, id: i64) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().find(|c| c.user.username == username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().any(|c| c.user.username == username))
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users.values().any(|c| c.user.username == user.username) {
            return Err(ConflictError::UsernameTaken.into());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = User {
            id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.created_at,
        };

        users.insert(
            id,
            UserCredentials {
                user: created.clone(),
                hashed_password: user.hashed_password,
            },
        );
        Ok(created)
    }
}
