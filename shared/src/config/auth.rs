//! Authentication configuration

use serde::{Deserialize, Serialize};

/// Default lifetime of both token kinds: one day
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;

/// JWT signing configuration
///
/// Access and refresh tokens are signed with two independent secrets. Either
/// may be absent from the configuration; issuing a token of that kind then
/// fails with a configuration error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for signing access tokens (`JWT_SECRET_AT`)
    #[serde(default)]
    pub access_secret: Option<String>,

    /// Secret for signing refresh tokens (`JWT_SECRET_RT`)
    #[serde(default)]
    pub refresh_secret: Option<String>,

    /// Access token lifetime in seconds
    #[serde(default = "default_ttl")]
    pub access_token_ttl_seconds: i64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_ttl")]
    pub refresh_token_ttl_seconds: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: None,
            refresh_secret: None,
            access_token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

impl JwtConfig {
    /// Create a JWT configuration with both secrets set
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: Some(access_secret.into()),
            refresh_secret: Some(refresh_secret.into()),
            ..Default::default()
        }
    }

    /// Names of the secrets that are missing or blank
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.access_secret) {
            missing.push("JWT_SECRET_AT");
        }
        if is_blank(&self.refresh_secret) {
            missing.push("JWT_SECRET_RT");
        }
        missing
    }

    /// Whether both secrets are set to the same value
    pub fn secrets_collide(&self) -> bool {
        match (&self.access_secret, &self.refresh_secret) {
            (Some(access), Some(refresh)) => access == refresh,
            _ => false,
        }
    }
}

/// Password hashing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// bcrypt work factor (4..=31)
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,
}

fn is_blank(secret: &Option<String>) -> bool {
    secret.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn default_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_SECONDS
}

fn default_bcrypt_cost() -> u32 {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_ttl_seconds, 86_400);
        assert_eq!(config.refresh_token_ttl_seconds, 86_400);
        assert_eq!(config.missing_secrets(), vec!["JWT_SECRET_AT", "JWT_SECRET_RT"]);
        assert!(!config.secrets_collide());
    }

    #[test]
    fn test_jwt_config_new() {
        let config = JwtConfig::new("access", "refresh");
        assert_eq!(config.access_token_ttl_seconds, DEFAULT_TOKEN_TTL_SECONDS);
        assert!(config.missing_secrets().is_empty());
        assert!(!config.secrets_collide());
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let config = JwtConfig {
            refresh_secret: Some("   ".to_string()),
            ..JwtConfig::new("access", "x")
        };
        assert_eq!(config.missing_secrets(), vec!["JWT_SECRET_RT"]);
    }

    #[test]
    fn test_colliding_secrets() {
        let config = JwtConfig::new("same", "same");
        assert!(config.secrets_collide());
    }
}
