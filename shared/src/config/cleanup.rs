//! Refresh token sweep configuration

use serde::{Deserialize, Serialize};

/// Configuration for the periodic refresh token sweep
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Whether the sweep runs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often to run the sweep (in seconds)
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// How long a dead token is kept before it is purged (in seconds)
    #[serde(default = "default_grace_period_seconds")]
    pub grace_period_seconds: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval_seconds(),
            grace_period_seconds: default_grace_period_seconds(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    3600 // hourly
}

fn default_grace_period_seconds() -> i64 {
    6 * 3600
}
