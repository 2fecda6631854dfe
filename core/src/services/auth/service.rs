//! Main authentication service implementation

use std::sync::Arc;

use tracing::{info, warn};

use pb_shared::utils::timestamp::truncate_to_seconds;
use pb_shared::utils::validation::{capitalize_name, normalize_username};

use crate::domain::entities::token::RefreshClaims;
use crate::domain::entities::user::{NewUser, Role, User};
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, ConflictError, DomainError, DomainResult};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::clock::{Clock, SystemClock};
use crate::services::token::TokenService;

use super::password::PasswordHasher;

/// Registration input, already validated for shape by the caller
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Authentication service for the account-facing flows
pub struct AuthService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    /// User repository for credential lookups and registration
    user_repository: Arc<U>,
    /// Token service for JWT management
    token_service: Arc<TokenService<T>>,
    /// Password hashing
    password_hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl<U, T> AuthService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `token_service` - Service for JWT token management
    /// * `password_hasher` - bcrypt hasher used on registration and login
    pub fn new(
        user_repository: Arc<U>,
        token_service: Arc<TokenService<T>>,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            user_repository,
            token_service,
            password_hasher,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for user timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying token service
    pub fn token_service(&self) -> &Arc<TokenService<T>> {
        &self.token_service
    }

    /// Look a user up by username and check the password
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - The username exists and the password matches
    /// * `Ok(None)` - Unknown username or wrong password
    /// * `Err(DomainError)` - Storage or hashing failure
    pub async fn find_user_from_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> DomainResult<Option<User>> {
        let username = normalize_username(username);

        let credentials = match self
            .user_repository
            .find_credentials_by_username(&username)
            .await?
        {
            Some(credentials) => credentials,
            None => return Ok(None),
        };

        let matches = self
            .password_hasher
            .verify(password, &credentials.hashed_password)
            .await?;

        Ok(matches.then_some(credentials.user))
    }

    /// Register a new user and open a first session
    ///
    /// The username is stored lowercase and both names capitalized. New users
    /// get the `user` role.
    ///
    /// # Errors
    ///
    /// * `Conflict(UsernameTaken)` - the username is already registered
    pub async fn register(&self, input: RegisterUser) -> DomainResult<AuthResponse> {
        let username = normalize_username(&input.username);

        if self.user_repository.exists_by_username(&username).await? {
            return Err(ConflictError::UsernameTaken.into());
        }

        let hashed_password = self.password_hasher.hash(&input.password).await?;

        let user = self
            .user_repository
            .create(NewUser {
                username,
                first_name: capitalize_name(&input.first_name),
                last_name: capitalize_name(&input.last_name),
                role: Role::default(),
                hashed_password,
                created_at: truncate_to_seconds(self.clock.now()),
            })
            .await?;

        info!(user_id = user.id, "User registered");

        let tokens = self.token_service.generate_auth_tokens(&user, None).await?;
        Ok(AuthResponse::from_token_pair(user, tokens))
    }

    /// Log in with username and password
    ///
    /// # Errors
    ///
    /// * `Auth(InvalidCredentials)` - unknown username or wrong password
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthResponse> {
        let user = match self.find_user_from_credentials(username, password).await? {
            Some(user) => user,
            None => {
                warn!("Login failed: invalid credentials");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let tokens = self.token_service.generate_auth_tokens(&user, None).await?;

        info!(user_id = user.id, "User logged in");
        Ok(AuthResponse::from_token_pair(user, tokens))
    }

    /// Load the authenticated user
    pub async fn me(&self, user_id: i64) -> DomainResult<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))
    }

    /// Exchange a verified refresh token for a new token pair
    ///
    /// # Errors
    ///
    /// * `Auth(AuthenticationRequired)` - the token's user no longer exists
    /// * any rotation error of [`TokenService::generate_auth_tokens`]
    pub async fn refresh(&self, claims: &RefreshClaims) -> DomainResult<AuthResponse> {
        let user = self
            .user_repository
            .find_by_id(claims.sub)
            .await?
            .ok_or(DomainError::Auth(AuthError::AuthenticationRequired))?;

        let tokens = self
            .token_service
            .generate_auth_tokens(&user, Some(claims))
            .await?;

        Ok(AuthResponse::from_token_pair(user, tokens))
    }

    /// Revoke the presented refresh token
    pub async fn logout(&self, claims: &RefreshClaims) -> DomainResult<()> {
        self.token_service.revoke_refresh_token(claims.jti).await
    }

    /// Revoke every session of a user
    ///
    /// # Errors
    ///
    /// * `Conflict(NoActiveSessions)` - the user had nothing left to revoke
    pub async fn logout_all(&self, user_id: i64) -> DomainResult<u64> {
        let revoked = self
            .token_service
            .revoke_all_refresh_tokens_of_user(user_id)
            .await?;

        if revoked == 0 {
            return Err(ConflictError::NoActiveSessions.into());
        }

        Ok(revoked)
    }
}
