use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::{bail, Context};
use tracing::{info, warn};

use pb_api::app::create_app;
use pb_api::routes::auth::AppState;
use pb_api::telemetry::init_tracing;
use pb_core::services::auth::{AuthService, PasswordHasher};
use pb_core::services::token::{
    TokenCleanupConfig, TokenCleanupService, TokenService, TokenServiceConfig, TokenVerifier,
};
use pb_infra::{DatabasePool, SqliteTokenRepository, SqliteUserRepository};
use pb_shared::config::{AppConfig, Environment};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Environment-specific file first; variables already set are never overwritten
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!(environment = %config.environment, "Starting Postboard API Server");

    // Refuse to start without both signing secrets
    let missing = config.auth.jwt.missing_secrets();
    if !missing.is_empty() {
        bail!("Missing JWT secrets: {}", missing.join(", "));
    }
    if config.auth.jwt.secrets_collide() {
        bail!("JWT_SECRET_AT and JWT_SECRET_RT must be different");
    }

    if config.environment.is_production() && config.cors.allows_any_origin() {
        warn!("CORS allows any origin in production");
    }

    let pool = DatabasePool::new(&config.database)
        .await
        .context("Failed to open database")?;
    info!("{}", pool.get_statistics());

    let user_repository = Arc::new(SqliteUserRepository::new(pool.get_pool().clone()));
    let token_repository = SqliteTokenRepository::new(pool.get_pool().clone());

    let token_service = Arc::new(
        TokenService::new(
            token_repository.clone(),
            TokenServiceConfig::from(&config.auth.jwt),
        )
        .context("Invalid token configuration")?,
    );

    let auth_service = Arc::new(AuthService::new(
        user_repository,
        token_service.clone(),
        PasswordHasher::from(&config.auth.password),
    ));

    // Sweep of dead refresh token records
    let cleanup = Arc::new(TokenCleanupService::new(
        Arc::new(token_repository),
        TokenCleanupConfig::from(&config.cleanup),
    ));
    let cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(AppState::new(auth_service));
    let verifier: Arc<dyn TokenVerifier> = token_service;
    let verifier = web::Data::from(verifier);
    let pool_data = web::Data::new(pool.clone());
    let cors_config = config.cors.clone();

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || {
        create_app(app_state.clone(), verifier.clone(), &cors_config).app_data(pool_data.clone())
    })
    .keep_alive(std::time::Duration::from_secs(config.server.keep_alive));

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(task) = cleanup_task {
        task.abort();
    }
    pool.close().await;

    info!("Postboard API Server stopped");
    Ok(())
}
