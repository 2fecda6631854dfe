//! Database module - SQLite implementations using SQLx
//!
//! This module provides the database access layer including:
//! - Connection pool management and schema bootstrap
//! - Repository pattern implementations

pub mod connection;
pub mod sqlite;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use sqlite::{SqliteTokenRepository, SqliteUserRepository};
