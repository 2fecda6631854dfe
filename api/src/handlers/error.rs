//! Conversion of domain errors into HTTP responses
//!
//! Every failing route ends up here so the status mapping lives in one place.

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use pb_core::errors::{AuthError, ConflictError, DomainError, TokenError};

use crate::dto::{ErrorResponse, ErrorResponseExt};

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(conflict) if conflict.is_ledger_state() => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
        DomainError::Auth(_) | DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Configuration { .. } | DomainError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_code(error: &DomainError) -> String {
    match error {
        DomainError::Validation { .. } => "validation_error".to_string(),
        DomainError::NotFound { .. } => "not_found".to_string(),
        DomainError::Conflict(conflict) => conflict.code().to_ascii_lowercase(),
        DomainError::Auth(AuthError::InvalidCredentials) => "invalid_credentials".to_string(),
        DomainError::Auth(AuthError::AuthenticationRequired) => {
            "authentication_required".to_string()
        }
        DomainError::Token(TokenError::TokenExpired) => "token_expired".to_string(),
        DomainError::Token(_) => "invalid_token".to_string(),
        DomainError::Configuration { .. } | DomainError::Internal { .. } => {
            "internal_error".to_string()
        }
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let status = status_for(&error);

    let message = match &error {
        DomainError::Configuration { .. } | DomainError::Internal { .. } => {
            tracing::error!("Request failed: {}", error);
            "An internal error occurred".to_string()
        }
        DomainError::Conflict(
            ConflictError::AlreadyConsumed | ConflictError::AlreadyRevoked,
        ) => {
            tracing::warn!("Request rejected: {}", error);
            error.to_string()
        }
        _ => {
            tracing::debug!("Request rejected: {}", error);
            error.to_string()
        }
    };

    ErrorResponse::new(error_code(&error), message).to_response(status)
}

/// Turn `validator` failures into a single validation error naming the bad fields
pub fn validation_error(errors: &ValidationErrors) -> DomainError {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();

    DomainError::Validation {
        message: format!("Invalid fields: {}", fields.join(", ")),
    }
}

/// Error handler for malformed JSON bodies
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = error.to_string();
    let response = handle_domain_error(DomainError::Validation { message });
    actix_web::error::InternalError::from_response(error, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&DomainError::not_found("Refresh token")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ConflictError::AlreadyConsumed.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ConflictError::Expired.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ConflictError::NoActiveSessions.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ConflictError::UsernameTaken.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&TokenError::InvalidSignature.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&DomainError::Configuration {
                message: "JWT_SECRET_AT is not configured".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_internal_errors_are_not_leaked() {
        let response = handle_domain_error(DomainError::internal("disk I/O error"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[actix_web::test]
    async fn test_conflict_body() {
        let response = handle_domain_error(ConflictError::AlreadyConsumed.into());

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "token_already_consumed");
        assert_eq!(body["message"], "Refresh token already consumed");
        assert!(body["timestamp"].is_string());
    }
}
