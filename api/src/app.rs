//! Application state and factory
//!
//! This module provides the factory for creating the Actix-web application
//! from already constructed services.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use pb_core::repositories::{TokenRepository, UserRepository};
use pb_core::services::token::TokenVerifier;
use pb_shared::config::CorsConfig;

use crate::dto::ErrorResponse;
use crate::handlers::error::json_error_handler;
use crate::middleware::cors::create_cors;
use crate::routes::{self, auth::AppState};

/// Create and configure the application with all dependencies
///
/// `verifier` is what the JWT middleware checks bearer tokens with; in
/// production it is the same `TokenService` the auth service uses.
pub fn create_app<U, T>(
    app_state: web::Data<AppState<U, T>>,
    verifier: web::Data<dyn TokenVerifier>,
    cors_config: &CorsConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(verifier)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        // Request spans first, then CORS
        .wrap(create_cors(cors_config))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(routes::health::health_check))
        .service(web::scope("/api/v1").configure(routes::auth::configure::<U, T>))
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        "not_found",
        "The requested resource was not found",
    ))
}
