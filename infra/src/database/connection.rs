//! Database connection pool management
//!
//! This module provides database connection pooling using SQLx with SQLite.
//! It implements pool configuration, the schema bootstrap, health checks and
//! connection management.

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use pb_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Tables and indexes of the store, applied with `CREATE ... IF NOT EXISTS`
const SCHEMA: &str = include_str!("schema.sql");

/// Database connection pool wrapper
///
/// Manages the SQLite connection pool with configurable settings
/// for connection limits, timeouts, and health checks.
#[derive(Clone)]
pub struct DatabasePool {
    /// SQLx SQLite connection pool
    pool: SqlitePool,
    /// Configuration used to create this pool
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `config` - Database configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Database pool or error
    ///
    /// # Example
    /// ```no_run
    /// use pb_shared::config::DatabaseConfig;
    /// use pb_infra::database::DatabasePool;
    ///
    /// async fn create_pool() -> Result<DatabasePool, Box<dyn std::error::Error>> {
    ///     let config = DatabaseConfig::new("sqlite://postboard.db?mode=rwc");
    ///     let pool = DatabasePool::new(&config).await?;
    ///     Ok(pool)
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, InfrastructureError> {
        tracing::info!(
            "Creating database connection pool with max_connections: {}",
            config.max_connections
        );

        let connect_options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.connect_timeout));

        let pool_options = if config.is_in_memory() {
            // Every connection to `:memory:` opens its own empty database, so
            // the pool holds exactly one connection for its whole life
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(600)) // 10 minutes
                .max_lifetime(Duration::from_secs(1800)) // 30 minutes
        };

        let connect_options = if config.is_in_memory() {
            connect_options
        } else {
            connect_options.journal_mode(SqliteJournalMode::Wal)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create database pool: {}", e);
                InfrastructureError::Database(e)
            })?;

        let database = Self {
            pool,
            config: config.clone(),
        };

        if config.bootstrap_schema {
            database.bootstrap_schema().await?;
        }

        tracing::info!("Database connection pool created successfully");

        Ok(database)
    }

    /// Open a private in-memory database with the schema applied
    pub async fn in_memory() -> Result<Self, InfrastructureError> {
        Self::new(&DatabaseConfig::new("sqlite::memory:")).await
    }

    /// Create the tables and indexes when they are missing
    pub async fn bootstrap_schema(&self) -> Result<(), InfrastructureError> {
        tracing::info!("Applying database schema");

        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Schema statement failed: {}", e);
                    InfrastructureError::Schema(e.to_string())
                })?;
        }

        tracing::info!("Database schema ready");
        Ok(())
    }

    /// Get a reference to the underlying SQLx pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Configuration this pool was created with
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Check if the database connection is healthy
    ///
    /// Performs a simple query to verify connectivity.
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if healthy, error otherwise
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        tracing::debug!("Performing database health check");

        let result = sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                InfrastructureError::Database(e)
            })?;

        let value: i64 = result.try_get(0).unwrap_or(0);

        if value == 1 {
            tracing::debug!("Database health check passed");
            Ok(true)
        } else {
            tracing::warn!("Database health check returned unexpected value: {}", value);
            Ok(false)
        }
    }

    /// Get connection pool statistics
    pub fn get_statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    /// Close all connections in the pool
    ///
    /// This should be called during application shutdown.
    pub async fn close(&self) {
        tracing::info!("Closing database connection pool");
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    /// Total number of connections in the pool
    pub connections: u32,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Maximum allowed connections
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}
