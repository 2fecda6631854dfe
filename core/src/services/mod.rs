//! Business services containing domain logic and use cases.

pub mod auth;
pub mod clock;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, PasswordHasher, RegisterUser};
pub use clock::{Clock, SystemClock};
pub use token::{
    CleanupResult, TokenCleanupConfig, TokenCleanupService, TokenService, TokenServiceConfig,
    TokenVerifier,
};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
