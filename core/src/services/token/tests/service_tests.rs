//! Unit tests for token issuance, verification and revocation

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::entities::user::{Role, User};
use crate::errors::{ConflictError, DomainError, TokenError};
use crate::repositories::{MockTokenRepository, TokenRepository};
use crate::services::clock::ManualClock;
use crate::services::token::{TokenService, TokenServiceConfig, TokenVerifier};

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub(super) fn test_user(id: i64) -> User {
    User {
        id,
        username: format!("user{}", id),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role: Role::User,
        created_at: t0(),
        updated_at: t0(),
    }
}

pub(super) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig::new("access-secret-for-tests", "refresh-secret-for-tests")
}

pub(super) fn create_test_service(
    repo: MockTokenRepository,
    clock: &ManualClock,
) -> TokenService<MockTokenRepository> {
    TokenService::new(repo, test_config())
        .unwrap()
        .with_clock(Arc::new(clock.clone()))
}

#[tokio::test]
async fn test_login_creates_exactly_one_record() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo.clone(), &clock);

    let pair = service.generate_auth_tokens(&test_user(7), None).await.unwrap();

    assert_eq!(repo.len().await, 1);
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();
    let record = repo.find_by_id(claims.jti).await.unwrap().unwrap();
    assert_eq!(record.user_id, 7);
    assert_eq!(record.created_at, t0());
    assert_eq!(record.updated_at, t0());
    assert_eq!(record.expires_at, t0() + Duration::hours(24));
    assert!(record.revoked_at.is_none());
}

#[tokio::test]
async fn test_tokens_share_iat_and_have_one_day_lifetime() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);

    let pair = service.generate_auth_tokens(&test_user(7), None).await.unwrap();

    let access = service.verify_access_token(&pair.access_token).unwrap();
    let refresh = service.verify_refresh_token(&pair.refresh_token).unwrap();

    assert_eq!(access.sub, 7);
    assert_eq!(refresh.sub, 7);
    assert_eq!(access.iat, t0().timestamp());
    assert_eq!(refresh.iat, t0().timestamp());
    assert_eq!(access.exp - access.iat, 86_400);
    assert_eq!(refresh.exp - refresh.iat, 86_400);
    assert_ne!(pair.access_token, pair.refresh_token);
}

#[tokio::test]
async fn test_iat_is_truncated_to_whole_seconds() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0() + Duration::milliseconds(750));
    let service = create_test_service(repo.clone(), &clock);

    let pair = service.generate_auth_tokens(&test_user(1), None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();

    assert_eq!(claims.iat, t0().timestamp());
    let record = repo.find_by_id(claims.jti).await.unwrap().unwrap();
    assert_eq!(record.updated_at, t0());
}

#[tokio::test]
async fn test_tokens_are_not_interchangeable() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);

    let pair = service.generate_auth_tokens(&test_user(1), None).await.unwrap();

    let result = service.verify_access_token(&pair.refresh_token);
    assert!(matches!(result, Err(DomainError::Token(TokenError::InvalidSignature))));

    let result = service.verify_refresh_token(&pair.access_token);
    assert!(matches!(result, Err(DomainError::Token(TokenError::InvalidSignature))));
}

#[tokio::test]
async fn test_expired_access_token_is_rejected() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);

    let pair = service.generate_auth_tokens(&test_user(1), None).await.unwrap();

    clock.advance(Duration::hours(24) - Duration::seconds(1));
    assert!(service.verify_access_token(&pair.access_token).is_ok());

    clock.advance(Duration::seconds(1));
    let result = service.verify_access_token(&pair.access_token);
    assert!(matches!(result, Err(DomainError::Token(TokenError::TokenExpired))));
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);

    let result = service.verify_access_token("not.a.jwt");
    assert!(matches!(result, Err(DomainError::Token(_))));

    let result = service.verify_refresh_token("garbage");
    assert!(matches!(result, Err(DomainError::Token(TokenError::InvalidTokenFormat))));
}

#[tokio::test]
async fn test_verifier_trait_object_delegates() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);
    let pair = service.generate_auth_tokens(&test_user(3), None).await.unwrap();

    let verifier: Arc<dyn TokenVerifier> = Arc::new(service);
    assert_eq!(verifier.verify_access_token(&pair.access_token).unwrap().sub, 3);
    assert_eq!(verifier.verify_refresh_token(&pair.refresh_token).unwrap().sub, 3);
}

#[tokio::test]
async fn test_equal_secrets_are_refused() {
    let result = TokenService::new(
        MockTokenRepository::new(),
        TokenServiceConfig::new("same", "same"),
    );
    assert!(matches!(result, Err(DomainError::Configuration { .. })));
}

#[tokio::test]
async fn test_missing_secret_fails_before_touching_ledger() {
    let repo = MockTokenRepository::new();
    let config = TokenServiceConfig {
        refresh_secret: None,
        ..test_config()
    };
    let service = TokenService::new(repo.clone(), config).unwrap();

    let result = service.generate_auth_tokens(&test_user(1), None).await;

    match result {
        Err(DomainError::Configuration { message }) => assert!(message.contains("JWT_SECRET_RT")),
        other => panic!("expected configuration error, got {:?}", other),
    }
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_revoke_refresh_token_twice_is_an_error() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo.clone(), &clock);

    let pair = service.generate_auth_tokens(&test_user(1), None).await.unwrap();
    let jti = service.verify_refresh_token(&pair.refresh_token).unwrap().jti;

    clock.advance(Duration::minutes(1));
    service.revoke_refresh_token(jti).await.unwrap();

    let record = repo.find_by_id(jti).await.unwrap().unwrap();
    assert_eq!(record.revoked_at, Some(t0() + Duration::minutes(1)));

    let result = service.revoke_refresh_token(jti).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::AlreadyRevoked))
    ));

    // revokedAt never changes once set
    let record = repo.find_by_id(jti).await.unwrap().unwrap();
    assert_eq!(record.revoked_at, Some(t0() + Duration::minutes(1)));
}

#[tokio::test]
async fn test_revoke_unknown_token_is_not_found() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);

    let result = service.revoke_refresh_token(404).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_revoke_all_counts_active_records() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);
    let user = test_user(1);

    assert_eq!(service.revoke_all_refresh_tokens_of_user(1).await.unwrap(), 0);

    service.generate_auth_tokens(&user, None).await.unwrap();
    service.generate_auth_tokens(&user, None).await.unwrap();
    let other = service.generate_auth_tokens(&test_user(2), None).await.unwrap();

    assert_eq!(service.revoke_all_refresh_tokens_of_user(1).await.unwrap(), 2);
    assert_eq!(service.revoke_all_refresh_tokens_of_user(1).await.unwrap(), 0);

    // Other users keep their sessions
    let claims = service.verify_refresh_token(&other.refresh_token).unwrap();
    clock.advance(Duration::seconds(5));
    assert!(service.generate_auth_tokens(&test_user(2), Some(&claims)).await.is_ok());
}
