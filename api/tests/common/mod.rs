//! Shared setup for the HTTP tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use chrono::{TimeZone, Utc};

use pb_api::routes::auth::AppState;
use pb_core::repositories::{MockTokenRepository, MockUserRepository};
use pb_core::services::auth::{AuthService, PasswordHasher};
use pb_core::services::clock::ManualClock;
use pb_core::services::token::{TokenService, TokenServiceConfig, TokenVerifier};

/// Build the app over a [`TestContext`]
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(pb_api::app::create_app(
            $ctx.state.clone(),
            $ctx.verifier.clone(),
            &pb_shared::config::CorsConfig::development(),
        ))
        .await
    };
}

pub const PASSWORD: &str = "correct horse";

pub struct TestContext {
    pub state: web::Data<AppState<MockUserRepository, MockTokenRepository>>,
    pub verifier: web::Data<dyn TokenVerifier>,
    pub clock: ManualClock,
    pub users: MockUserRepository,
    pub tokens: MockTokenRepository,
}

pub fn setup() -> TestContext {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    let users = MockUserRepository::new();
    let tokens = MockTokenRepository::new();

    let token_service = Arc::new(
        TokenService::new(
            tokens.clone(),
            TokenServiceConfig::new("access-secret-for-tests", "refresh-secret-for-tests"),
        )
        .unwrap()
        .with_clock(Arc::new(clock.clone())),
    );

    let auth_service = AuthService::new(
        Arc::new(users.clone()),
        token_service.clone(),
        PasswordHasher::new(4),
    )
    .with_clock(Arc::new(clock.clone()));

    let verifier: Arc<dyn TokenVerifier> = token_service;

    TestContext {
        state: web::Data::new(AppState::new(Arc::new(auth_service))),
        verifier: web::Data::from(verifier),
        clock,
        users,
        tokens,
    }
}

pub fn register_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "password": PASSWORD,
        "firstName": "ada",
        "lastName": "lovelace",
    })
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
