//! Periodic sweep of dead refresh token ledger records
//!
//! Records are never deleted by the token lifecycle itself. This service
//! removes records that expired more than a grace period ago, revoked or not,
//! so the ledger does not grow without bound.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

use pb_shared::CleanupConfig;

use crate::errors::DomainError;
use crate::repositories::TokenRepository;
use crate::services::clock::{Clock, SystemClock};

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// How long a dead record is kept before deletion (in seconds)
    pub grace_period_seconds: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            grace_period_seconds: 6 * 3600,
            enabled: true,
        }
    }
}

impl From<&CleanupConfig> for TokenCleanupConfig {
    fn from(config: &CleanupConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds,
            grace_period_seconds: config.grace_period_seconds,
            enabled: config.enabled,
        }
    }
}

/// Service for deleting dead refresh token records
pub struct TokenCleanupService<R: TokenRepository + 'static> {
    repository: Arc<R>,
    config: TokenCleanupConfig,
    clock: Arc<dyn Clock>,
}

impl<R: TokenRepository> TokenCleanupService<R> {
    /// Create a new token cleanup service
    pub fn new(repository: Arc<R>, config: TokenCleanupConfig) -> Self {
        Self {
            repository,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Records that expired before this instant are deleted
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.clock.now() - Duration::seconds(self.config.grace_period_seconds)
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the cycle; a disabled service reports nothing
    /// * `Err(DomainError)` - The ledger could not be swept
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let cutoff = self.cutoff();
        info!(%cutoff, "Starting refresh token cleanup cycle");

        let purged = self.repository.purge_stale(cutoff).await?;

        info!(purged, "Refresh token cleanup completed");

        Ok(CleanupResult {
            purged_tokens: purged,
            cutoff: Some(cutoff),
        })
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals.
    /// Failed cycles are logged and retried on the next tick.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Refresh token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Refresh token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!("Refresh token cleanup cycle failed: {}", e);
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    /// Number of ledger records deleted
    pub purged_tokens: u64,
    /// Cutoff used for the cycle, absent when cleanup is disabled
    pub cutoff: Option<DateTime<Utc>>,
}
