//! User repository trait defining the interface for the credential store.
//!
//! The token core only needs to look users up and create them on
//! registration; profile management is outside this crate.

use async_trait::async_trait;

use crate::domain::entities::user::{NewUser, User, UserCredentials};
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use pb_core::repositories::UserRepository;
/// use pb_core::domain::entities::user::{NewUser, User, UserCredentials};
/// use pb_core::errors::DomainError;
///
/// struct InMemoryUsers;
///
/// #[async_trait]
/// impl UserRepository for InMemoryUsers {
///     async fn find_by_id(&self, _id: i64) -> Result<Option<User>, DomainError> {
///         Ok(None)
///     }
///
///     // ... other methods
/// #   async fn find_credentials_by_username(&self, _: &str) -> Result<Option<UserCredentials>, DomainError> { Ok(None) }
/// #   async fn exists_by_username(&self, _: &str) -> Result<bool, DomainError> { Ok(false) }
/// #   async fn create(&self, _: NewUser) -> Result<User, DomainError> { unimplemented!() }
/// }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that id
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;

    /// Find a user and their password hash by (lowercase) username
    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError>;

    /// Check whether a username is already registered
    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError>;

    /// Create a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The created user with its generated id
    /// * `Err(DomainError::Conflict(ConflictError::UsernameTaken))` - The username is taken
    ///
    /// [`ConflictError::UsernameTaken`]: crate::errors::ConflictError::UsernameTaken
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;
}
