//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT signing secrets, token lifetimes and password hashing
//! - `cleanup` - Periodic sweep of dead refresh tokens
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration
//!
//! Values are layered with the `config` crate: built-in defaults for the
//! detected environment, then `config/default.toml`, then
//! `config/<environment>.toml`, then `POSTBOARD__*` environment variables,
//! and finally the legacy `JWT_SECRET_AT`, `JWT_SECRET_RT` and `DATABASE_URL`
//! variables.

pub mod auth;
pub mod cleanup;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, PasswordConfig};
pub use cleanup::CleanupConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};

pub use ::config::ConfigError;

/// Prefix for environment variable overrides, e.g. `POSTBOARD__SERVER__PORT`
pub const ENV_PREFIX: &str = "POSTBOARD";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Refresh token sweep configuration
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Built-in defaults for an environment, before any external source is applied
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1", 8080),
            database: DatabaseConfig::new("sqlite://postboard_dev.db?mode=rwc"),
            auth: AuthConfig::default(),
            cleanup: CleanupConfig::default(),
            cors: CorsConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            database: DatabaseConfig::new("sqlite://postboard.db?mode=rwc")
                .with_max_connections(20),
            auth: AuthConfig::default(),
            cleanup: CleanupConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        Self::load_for(environment, "config")
    }

    /// Load configuration for an explicit environment, reading files from `config_dir`
    pub fn load_for(environment: Environment, config_dir: &str) -> Result<Self, ConfigError> {
        let defaults = ::config::Config::try_from(&Self::for_environment(environment))?;

        let config = ::config::Config::builder()
            .add_source(defaults)
            .add_source(
                ::config::File::with_name(&format!("{}/default", config_dir)).required(false),
            )
            .add_source(
                ::config::File::with_name(&format!("{}/{}", config_dir, environment))
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("auth.jwt.access_secret", std::env::var("JWT_SECRET_AT").ok())?
            .set_override_option("auth.jwt.refresh_secret", std::env::var("JWT_SECRET_RT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}
