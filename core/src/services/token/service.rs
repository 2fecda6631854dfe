//! Main token service implementation

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use pb_shared::utils::timestamp::truncate_to_seconds;

use crate::domain::entities::token::{
    AccessClaims, NewRefreshToken, RefreshClaims, RefreshTokenState, TokenPair,
};
use crate::domain::entities::user::User;
use crate::errors::{ConflictError, DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;
use crate::services::clock::{Clock, SystemClock};

use super::config::TokenServiceConfig;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Copy)]
enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn secret_name(self) -> &'static str {
        match self {
            TokenKind::Access => "JWT_SECRET_AT",
            TokenKind::Refresh => "JWT_SECRET_RT",
        }
    }
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &Option<String>) -> Option<Self> {
        secret.as_deref().map(|s| Self {
            encoding: EncodingKey::from_secret(s.as_bytes()),
            decoding: DecodingKey::from_secret(s.as_bytes()),
        })
    }
}

/// Token lifecycle manager
///
/// Issues access/refresh token pairs, rotates refresh tokens against the
/// ledger and revokes them. Access and refresh tokens are signed with two
/// independent secrets; a token of one kind never verifies as the other.
pub struct TokenService<R: TokenRepository> {
    pub(crate) repository: R,
    config: TokenServiceConfig,
    access_keys: Option<SigningKeys>,
    refresh_keys: Option<SigningKeys>,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    ///
    /// Either secret may be absent; issuing or verifying that kind of token
    /// then fails with [`DomainError::Configuration`].
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or a configuration error if both secrets are
    /// set to the same value
    pub fn new(repository: R, config: TokenServiceConfig) -> Result<Self, DomainError> {
        if let (Some(access), Some(refresh)) = (&config.access_secret, &config.refresh_secret) {
            if access == refresh {
                return Err(DomainError::Configuration {
                    message: "JWT_SECRET_AT and JWT_SECRET_RT must be different".to_string(),
                });
            }
        }

        // Expiry is checked against the injected clock instead
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            repository,
            access_keys: SigningKeys::from_secret(&config.access_secret),
            refresh_keys: SigningKeys::from_secret(&config.refresh_secret),
            config,
            validation,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Issues an access token and a refresh token for `user`
    ///
    /// Without `previous`, a new ledger record is created and its id becomes
    /// the refresh token's `jti`. With `previous` (the verified claims of the
    /// refresh token being presented), that record is rotated in place and
    /// keeps its id.
    ///
    /// Both tokens share one whole-second `iat`.
    ///
    /// # Errors
    ///
    /// * `Configuration` - a signing secret is missing; the ledger is left untouched
    /// * `NotFound` - `previous.jti` has no ledger record
    /// * `Conflict(AlreadyRevoked | Expired | AlreadyConsumed)` - the record cannot be rotated;
    ///   a second rotation within the same whole second counts as consumed
    pub async fn generate_auth_tokens(
        &self,
        user: &User,
        previous: Option<&RefreshClaims>,
    ) -> DomainResult<TokenPair> {
        self.signing_keys(TokenKind::Access)?;
        self.signing_keys(TokenKind::Refresh)?;

        let current = self.clock.now();
        let issued_at = truncate_to_seconds(current);
        let access_expires_at = issued_at + Duration::seconds(self.config.access_token_ttl_seconds);
        let refresh_expires_at =
            issued_at + Duration::seconds(self.config.refresh_token_ttl_seconds);

        let access_token = self.encode_jwt(
            TokenKind::Access,
            &AccessClaims {
                sub: user.id,
                iat: issued_at.timestamp(),
                exp: access_expires_at.timestamp(),
            },
        )?;

        let jti = match previous {
            None => self.insert_refresh_token(user.id, issued_at, refresh_expires_at).await?,
            Some(claims) => {
                self.rotate_refresh_token(claims, current, issued_at, refresh_expires_at)
                    .await?
            }
        };

        let refresh_token = self.encode_jwt(
            TokenKind::Refresh,
            &RefreshClaims {
                sub: user.id,
                jti,
                iat: issued_at.timestamp(),
                exp: refresh_expires_at.timestamp(),
            },
        )?;

        Ok(TokenPair::new(access_token, refresh_token))
    }

    async fn insert_refresh_token(
        &self,
        user_id: i64,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<i64> {
        let record = self
            .repository
            .insert_refresh_token(NewRefreshToken {
                user_id,
                issued_at,
                expires_at,
            })
            .await?;

        info!(user_id, jti = record.id, "Refresh token issued");
        Ok(record.id)
    }

    async fn rotate_refresh_token(
        &self,
        previous: &RefreshClaims,
        current: DateTime<Utc>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<i64> {
        let record = self
            .repository
            .find_by_id(previous.jti)
            .await?
            .ok_or_else(|| DomainError::not_found("Refresh token"))?;

        match record.state(current) {
            RefreshTokenState::Revoked => {
                warn!(jti = record.id, user_id = record.user_id, "Rotation of revoked refresh token");
                return Err(ConflictError::AlreadyRevoked.into());
            }
            RefreshTokenState::Expired => {
                debug!(jti = record.id, "Rotation of expired refresh token");
                return Err(ConflictError::Expired.into());
            }
            RefreshTokenState::Active => {}
        }

        let presented_iat = previous
            .issued_at()
            .ok_or(DomainError::Token(TokenError::InvalidClaims))?;

        if record.updated_at != presented_iat {
            warn!(
                jti = record.id,
                user_id = record.user_id,
                "Refresh token replay detected"
            );
            return Err(ConflictError::AlreadyConsumed.into());
        }

        // A rotation within the second of the last one would reissue the
        // presented token unchanged
        if issued_at <= record.updated_at {
            warn!(
                jti = record.id,
                user_id = record.user_id,
                "Refresh token rotated twice within one second"
            );
            return Err(ConflictError::AlreadyConsumed.into());
        }

        let rotated = self
            .repository
            .rotate(record.id, presented_iat, expires_at, issued_at)
            .await?;

        if !rotated {
            // Lost a race against a concurrent rotation or revocation
            warn!(jti = record.id, user_id = record.user_id, "Concurrent refresh token rotation");
            return Err(ConflictError::AlreadyConsumed.into());
        }

        info!(jti = record.id, user_id = record.user_id, "Refresh token rotated");
        Ok(record.id)
    }

    /// Revokes a single refresh token record
    ///
    /// # Errors
    ///
    /// * `NotFound` - no record with that id
    /// * `Conflict(AlreadyRevoked)` - the record was already revoked
    pub async fn revoke_refresh_token(&self, token_id: i64) -> DomainResult<()> {
        let record = self
            .repository
            .find_by_id(token_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Refresh token"))?;

        if record.is_revoked() {
            return Err(ConflictError::AlreadyRevoked.into());
        }

        let now = truncate_to_seconds(self.clock.now());
        if !self.repository.revoke(token_id, now).await? {
            return Err(ConflictError::AlreadyRevoked.into());
        }

        info!(jti = token_id, user_id = record.user_id, "Refresh token revoked");
        Ok(())
    }

    /// Revokes every unrevoked refresh token of a user
    ///
    /// # Returns
    ///
    /// The number of records revoked; zero when the user had none
    pub async fn revoke_all_refresh_tokens_of_user(&self, user_id: i64) -> DomainResult<u64> {
        let now = truncate_to_seconds(self.clock.now());
        let count = self.repository.revoke_all_for_user(user_id, now).await?;

        info!(user_id, count, "Revoked all refresh tokens of user");
        Ok(count)
    }

    /// Verifies an access token and returns the claims
    ///
    /// # Errors
    ///
    /// * `Token(TokenExpired)` - `exp` is not after the current time
    /// * `Token(InvalidSignature | InvalidTokenFormat | InvalidClaims)` - not a valid access token
    pub fn verify_access_token(&self, token: &str) -> DomainResult<AccessClaims> {
        let claims: AccessClaims = self.decode_jwt(TokenKind::Access, token)?;
        self.ensure_not_expired(claims.exp)?;
        Ok(claims)
    }

    /// Verifies a refresh token's signature and expiry and returns the claims
    ///
    /// Ledger state is not consulted here; it is checked on rotation.
    pub fn verify_refresh_token(&self, token: &str) -> DomainResult<RefreshClaims> {
        let claims: RefreshClaims = self.decode_jwt(TokenKind::Refresh, token)?;
        self.ensure_not_expired(claims.exp)?;
        Ok(claims)
    }

    fn ensure_not_expired(&self, exp: i64) -> DomainResult<()> {
        if self.clock.now().timestamp() >= exp {
            return Err(TokenError::TokenExpired.into());
        }
        Ok(())
    }

    fn signing_keys(&self, kind: TokenKind) -> DomainResult<&SigningKeys> {
        let keys = match kind {
            TokenKind::Access => self.access_keys.as_ref(),
            TokenKind::Refresh => self.refresh_keys.as_ref(),
        };

        keys.ok_or_else(|| DomainError::Configuration {
            message: format!("{} is not configured", kind.secret_name()),
        })
    }

    /// Encodes claims into a JWT
    fn encode_jwt<C: Serialize>(&self, kind: TokenKind, claims: &C) -> DomainResult<String> {
        let keys = self.signing_keys(kind)?;
        encode(&Header::new(ALGORITHM), claims, &keys.encoding).map_err(|e| {
            error!(?kind, "Failed to sign token: {}", e);
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    fn decode_jwt<C: DeserializeOwned>(&self, kind: TokenKind, token: &str) -> DomainResult<C> {
        let keys = self.signing_keys(kind)?;
        let token_data = decode::<C>(token, &keys.decoding, &self.validation).map_err(|e| {
            let error = match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => TokenError::InvalidClaims,
                _ => TokenError::InvalidTokenFormat,
            };
            debug!(?kind, ?error, "Token rejected");
            DomainError::Token(error)
        })?;

        Ok(token_data.claims)
    }
}

/// Stateless token verification, as used by request authentication
pub trait TokenVerifier: Send + Sync {
    fn verify_access_token(&self, token: &str) -> DomainResult<AccessClaims>;

    fn verify_refresh_token(&self, token: &str) -> DomainResult<RefreshClaims>;
}

impl<R: TokenRepository> TokenVerifier for TokenService<R> {
    fn verify_access_token(&self, token: &str) -> DomainResult<AccessClaims> {
        TokenService::verify_access_token(self, token)
    }

    fn verify_refresh_token(&self, token: &str) -> DomainResult<RefreshClaims> {
        TokenService::verify_refresh_token(self, token)
    }
}
