//! Authentication route handlers
//!
//! This module contains all authentication-related endpoints including:
//! - Registration and login
//! - The current user
//! - Token refresh
//! - Logout of one or all sessions

pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;

use std::sync::Arc;

use actix_web::web;

use pb_core::repositories::{TokenRepository, UserRepository};
use pb_core::services::auth::AuthService;

use crate::middleware::auth::JwtAuth;

pub use login::login;
pub use logout::{logout, logout_all};
pub use me::me;
pub use refresh::refresh;
pub use register::register;

/// Application state that holds shared services
pub struct AppState<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub auth_service: Arc<AuthService<U, T>>,
}

impl<U, T> AppState<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(auth_service: Arc<AuthService<U, T>>) -> Self {
        Self { auth_service }
    }
}

/// Mount the `/auth` scope
pub fn configure<U, T>(cfg: &mut web::ServiceConfig)
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register::<U, T>))
            .route("/login", web::post().to(login::<U, T>))
            .service(
                web::resource("/me")
                    .wrap(JwtAuth::access())
                    .route(web::get().to(me::<U, T>)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(JwtAuth::refresh())
                    .route(web::post().to(refresh::<U, T>)),
            )
            .service(
                web::resource("/logout")
                    .wrap(JwtAuth::refresh())
                    .route(web::post().to(logout::<U, T>)),
            )
            .service(
                web::resource("/logout-all")
                    .wrap(JwtAuth::access())
                    .route(web::post().to(logout_all::<U, T>)),
            ),
    );
}
