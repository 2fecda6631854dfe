use std::collections::HashMap;
use std::time::Instant;

use actix_web::{web, HttpRequest, HttpResponse};

use pb_infra::DatabasePool;
use pb_shared::types::{HealthResponse, HealthStatus, ServiceHealth};

/// Handler for GET /health
///
/// Reports the database when a pool is registered as app data. Responds 503
/// when any checked service is unhealthy.
pub async fn health_check(req: HttpRequest) -> HttpResponse {
    let mut services = HashMap::new();

    if let Some(pool) = req.app_data::<web::Data<DatabasePool>>() {
        let started = Instant::now();
        let health = match pool.health_check().await {
            Ok(true) => ServiceHealth::healthy(started.elapsed().as_millis() as u64),
            Ok(false) => ServiceHealth::unhealthy("Unexpected health check result"),
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                ServiceHealth::unhealthy("Database unreachable")
            }
        };
        services.insert("database".to_string(), health);
    }

    let response = HealthResponse::from_services(services, env!("CARGO_PKG_VERSION"));

    match response.status {
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(response),
        _ => HttpResponse::Ok().json(response),
    }
}
