//! Domain entities representing core business objects.

pub mod token;
pub mod user;


// Re-export commonly used types
pub use token::{
    AccessClaims, NewRefreshToken, RefreshClaims, RefreshTokenRecord, RefreshTokenState,
    TokenPair,
};
pub use user::{NewUser, Role, User, UserCredentials};
