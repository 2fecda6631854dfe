//! # Postboard Core
//!
//! Core business logic and domain layer for the Postboard backend.
//! This crate contains domain entities, the token lifecycle and auth services,
//! repository interfaces, and error types that form the foundation of the
//! application architecture.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
