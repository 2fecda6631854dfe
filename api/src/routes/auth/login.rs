use actix_web::{web, HttpResponse};
use validator::Validate;

use pb_core::repositories::{TokenRepository, UserRepository};

use crate::dto::auth::LoginRequest;
use crate::handlers::error::{handle_domain_error, validation_error};

use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// ## Errors
/// - 400 Bad Request: Missing username or password
/// - 401 Unauthorized: Unknown username or wrong password
pub async fn login<U, T>(
    state: web::Data<AppState<U, T>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_domain_error(validation_error(&errors));
    }

    match state
        .auth_service
        .login(&request.username, &request.password)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(error) => handle_domain_error(error),
    }
}
