use actix_web::{web, HttpResponse};
use validator::Validate;

use pb_core::repositories::{TokenRepository, UserRepository};
use pb_core::services::auth::RegisterUser;

use crate::dto::auth::RegisterRequest;
use crate::handlers::error::{handle_domain_error, validation_error};

use super::AppState;

/// Handler for POST /api/v1/auth/register
///
/// Creates the account and opens its first session.
///
/// # Request Body
///
/// ```json
/// {
///     "username": "ada",
///     "password": "correct horse",
///     "firstName": "ada",
///     "lastName": "lovelace"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "user": { "id": 1, "username": "ada", "firstName": "Ada", ... },
///     "accessToken": "eyJ...",
///     "refreshToken": "eyJ..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Invalid body or username already taken
pub async fn register<U, T>(
    state: web::Data<AppState<U, T>>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_domain_error(validation_error(&errors));
    }

    let request = request.into_inner();
    let input = RegisterUser {
        username: request.username,
        password: request.password,
        first_name: request.first_name,
        last_name: request.last_name,
    };

    match state.auth_service.register(input).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(error) => handle_domain_error(error),
    }
}
