//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the bearer token from the Authorization header,
//! verifies it with the [`TokenVerifier`] registered as app data, and injects
//! the verified claims into the request.
//!
//! Each route is guarded for one token kind: access tokens for ordinary
//! authenticated routes, refresh tokens for `/refresh` and `/logout`.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use pb_core::{
    domain::entities::token::{AccessClaims, RefreshClaims},
    errors::{AuthError, DomainError},
    services::token::TokenVerifier,
};

use crate::handlers::error::handle_domain_error;

/// Authenticated user, from a verified access token
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID from the `sub` claim
    pub user_id: i64,
    pub claims: AccessClaims,
}

impl From<AccessClaims> for AuthContext {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            claims,
        }
    }
}

/// Verified refresh token claims presented as the bearer token
#[derive(Debug, Clone)]
pub struct RefreshContext {
    pub claims: RefreshClaims,
}

/// Which token kind a route accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy)]
pub struct JwtAuth {
    kind: TokenKind,
}

impl JwtAuth {
    /// Require a valid access token
    pub fn access() -> Self {
        Self {
            kind: TokenKind::Access,
        }
    }

    /// Require a valid refresh token
    pub fn refresh() -> Self {
        Self {
            kind: TokenKind::Refresh,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            kind: self.kind,
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    kind: TokenKind,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let kind = self.kind;

        Box::pin(async move {
            if let Err(error) = authenticate(&req, kind) {
                let response = handle_domain_error(error);
                return Ok(req.into_response(response).map_into_right_body());
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Verify the bearer token and store its claims in the request extensions
fn authenticate(req: &ServiceRequest, kind: TokenKind) -> Result<(), DomainError> {
    let token = extract_bearer_token(req)
        .ok_or(DomainError::Auth(AuthError::AuthenticationRequired))?;

    let verifier = req
        .app_data::<web::Data<dyn TokenVerifier>>()
        .ok_or_else(|| DomainError::Configuration {
            message: "Token verifier is not registered".to_string(),
        })?;

    match kind {
        TokenKind::Access => {
            let claims = verifier.verify_access_token(&token)?;
            req.extensions_mut().insert(AuthContext::from(claims));
        }
        TokenKind::Refresh => {
            let claims = verifier.verify_refresh_token(&token)?;
            req.extensions_mut().insert(RefreshContext { claims });
        }
    }

    Ok(())
}

/// Extracts Bearer token from Authorization header
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|s| s.to_string())
}

fn authentication_required() -> Error {
    let response = handle_domain_error(DomainError::Auth(AuthError::AuthenticationRequired));
    actix_web::error::InternalError::from_response("Authentication required", response).into()
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(authentication_required);

        ready(result)
    }
}

impl FromRequest for RefreshContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<RefreshContext>()
            .cloned()
            .ok_or_else(authentication_required);

        ready(result)
    }
}
