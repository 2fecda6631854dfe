//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Postboard backend,
//! following Clean Architecture principles. It provides the concrete
//! persistence behind the repository traits of `pb_core`.
//!
//! ## Architecture
//!
//! - **Database**: SQLite implementations using SQLx, a connection pool
//!   wrapper and an embedded schema bootstrap

// Re-export core types for convenience
pub use pb_core::errors::*;

/// Database module - SQLite implementations using SQLx
pub mod database;

pub use database::{DatabasePool, SqliteTokenRepository, SqliteUserRepository};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema bootstrap error
    #[error("Schema error: {0}")]
    Schema(String),
}
