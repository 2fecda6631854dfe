//! Shared utilities and common types for the Postboard server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and the layered configuration loader
//! - API error and health response bodies
//! - Utility functions (ledger timestamps, input normalization)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use crate::config::{
    AppConfig, AuthConfig, CleanupConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    JwtConfig, LoggingConfig, PasswordConfig, ServerConfig,
};
pub use crate::types::{ErrorResponse, HealthResponse};
pub use crate::utils::{timestamp, validation};
