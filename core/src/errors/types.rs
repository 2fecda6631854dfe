//! Error types for authentication, token handling and ledger state conflicts

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    AuthenticationRequired,
}

/// Token-related errors
///
/// Raised while signing or decoding a JWT. Ledger state problems are
/// [`ConflictError`]s instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// The request is well-formed but conflicts with the current state
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Refresh token already revoked")]
    AlreadyRevoked,

    #[error("Refresh token expired")]
    Expired,

    /// The presented refresh token was already rotated (replay)
    #[error("Refresh token already consumed")]
    AlreadyConsumed,

    #[error("No active sessions to logout")]
    NoActiveSessions,

    #[error("Username already taken")]
    UsernameTaken,
}

impl ConflictError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ConflictError::AlreadyRevoked => "TOKEN_ALREADY_REVOKED",
            ConflictError::Expired => "TOKEN_EXPIRED",
            ConflictError::AlreadyConsumed => "TOKEN_ALREADY_CONSUMED",
            ConflictError::NoActiveSessions => "NO_ACTIVE_SESSIONS",
            ConflictError::UsernameTaken => "USERNAME_TAKEN",
        }
    }

    /// Whether the conflict concerns the refresh token ledger
    pub fn is_ledger_state(&self) -> bool {
        matches!(
            self,
            ConflictError::AlreadyRevoked | ConflictError::Expired | ConflictError::AlreadyConsumed
        )
    }
}
