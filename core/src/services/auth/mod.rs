//! Authentication service module
//!
//! This module provides the account-facing flows built on the token service:
//! - User registration and login with username and password
//! - Token refresh with single-use refresh tokens
//! - Logout of one session or of all sessions

mod password;
mod service;


pub use password::PasswordHasher;
pub use service::{AuthService, RegisterUser};
