use actix_web::{web, HttpResponse};

use pb_core::repositories::{TokenRepository, UserRepository};

use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::RefreshContext;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges the refresh token presented as the bearer token for a new pair.
/// The presented token is consumed; presenting it again fails.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {refresh_token}
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "user": { ... },
///     "accessToken": "eyJ...",
///     "refreshToken": "eyJ..."
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid or expired refresh token
/// - 404 Not Found: The token's ledger record no longer exists
/// - 422 Unprocessable Entity: The token was revoked, expired or already consumed
pub async fn refresh<U, T>(
    state: web::Data<AppState<U, T>>,
    refresh: RefreshContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    match state.auth_service.refresh(&refresh.claims).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(error) => handle_domain_error(error),
    }
}
