//! Authentication response value object for API responses.

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;

/// Result of register, login and refresh: the user plus a fresh token pair
///
/// Serializes as `{"user": .., "accessToken": .., "refreshToken": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,

    /// JWT access token for API authentication
    pub access_token: String,

    /// JWT refresh token, single use
    pub refresh_token: String,
}

impl AuthResponse {
    /// Creates an authentication response from a token pair and the user
    pub fn from_token_pair(user: User, token_pair: TokenPair) -> Self {
        Self {
            user,
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
        }
    }
}
