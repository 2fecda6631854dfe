//! Configuration for the token service

use pb_shared::config::auth::DEFAULT_TOKEN_TTL_SECONDS;
use pb_shared::JwtConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Access token signing secret
    pub access_secret: Option<String>,
    /// Refresh token signing secret
    pub refresh_secret: Option<String>,
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_seconds: i64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_secret: None,
            refresh_secret: None,
            access_token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

impl TokenServiceConfig {
    /// Config with both secrets and the default lifetimes
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: Some(access_secret.into()),
            refresh_secret: Some(refresh_secret.into()),
            ..Default::default()
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        let non_blank = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());
        Self {
            access_secret: non_blank(&jwt.access_secret),
            refresh_secret: non_blank(&jwt.refresh_secret),
            access_token_ttl_seconds: jwt.access_token_ttl_seconds,
            refresh_token_ttl_seconds: jwt.refresh_token_ttl_seconds,
        }
    }
}
