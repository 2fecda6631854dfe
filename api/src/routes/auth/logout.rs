use actix_web::{web, HttpResponse};

use pb_core::repositories::{TokenRepository, UserRepository};

use crate::dto::auth::MessageResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::{AuthContext, RefreshContext};

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the refresh token presented as the bearer token.
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid refresh token
/// - 422 Unprocessable Entity: Already logged out
pub async fn logout<U, T>(
    state: web::Data<AppState<U, T>>,
    refresh: RefreshContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    match state.auth_service.logout(&refresh.claims).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Logged out")),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every refresh token of the authenticated user.
///
/// ## Errors
/// - 400 Bad Request: No active sessions to logout
/// - 401 Unauthorized: Missing or invalid access token
pub async fn logout_all<U, T>(
    state: web::Data<AppState<U, T>>,
    auth: AuthContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    match state.auth_service.logout_all(auth.user_id).await {
        Ok(_) => HttpResponse::Ok().json(MessageResponse::new("Logged out all sessions")),
        Err(error) => handle_domain_error(error),
    }
}
