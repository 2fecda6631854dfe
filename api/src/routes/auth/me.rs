use actix_web::{web, HttpResponse};

use pb_core::repositories::{TokenRepository, UserRepository};

use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for GET /api/v1/auth/me
///
/// Requires an access token. Responds with the user the token was issued to.
pub async fn me<U, T>(state: web::Data<AppState<U, T>>, auth: AuthContext) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    match state.auth_service.me(auth.user_id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(error) => handle_domain_error(error),
    }
}
