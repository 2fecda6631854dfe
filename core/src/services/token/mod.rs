//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Access and refresh token issuance
//! - Single-use refresh token rotation with replay detection
//! - Refresh token revocation
//! - Background sweep of dead ledger records

mod cleanup;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use service::{TokenService, TokenVerifier};
