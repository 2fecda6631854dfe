//! bcrypt password hashing on the blocking thread pool

use tracing::error;

use pb_shared::PasswordConfig;

use crate::errors::{DomainError, DomainResult};

/// Hashes and verifies passwords with bcrypt
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl From<&PasswordConfig> for PasswordHasher {
    fn from(config: &PasswordConfig) -> Self {
        Self::new(config.bcrypt_cost)
    }
}

impl PasswordHasher {
    /// Create a hasher with the given work factor
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password
    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                DomainError::internal("Password hashing failed")
            })
    }

    /// Check a password against a stored hash in constant time
    ///
    /// A malformed stored hash is an internal error, not a mismatch.
    pub async fn verify(&self, password: &str, hashed_password: &str) -> DomainResult<bool> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed_password))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| {
                error!("Stored password hash could not be verified: {}", e);
                DomainError::internal("Password verification failed")
            })
    }
}
