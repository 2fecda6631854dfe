//! Unit tests for refresh token rotation and replay detection

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::token::{NewRefreshToken, RefreshClaims, RefreshTokenRecord};
use crate::errors::{ConflictError, DomainError};
use crate::repositories::{MockTokenRepository, TokenRepository};
use crate::services::clock::ManualClock;
use crate::services::token::TokenService;

use super::service_tests::{create_test_service, t0, test_config, test_user};

/// Ledger that lets a competing rotation land between the service's read of
/// a record and its conditional update
struct InterleavingTokenRepository {
    inner: MockTokenRepository,
    competitor_at: DateTime<Utc>,
    armed: AtomicBool,
}

#[async_trait]
impl TokenRepository for InterleavingTokenRepository {
    async fn insert_refresh_token(
        &self,
        token: NewRefreshToken,
    ) -> Result<RefreshTokenRecord, DomainError> {
        self.inner.insert_refresh_token(token).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let found = self.inner.find_by_id(id).await?;

        if let Some(record) = &found {
            if self.armed.swap(false, Ordering::SeqCst) {
                let rotated = self
                    .inner
                    .rotate(
                        id,
                        record.updated_at,
                        self.competitor_at + Duration::hours(24),
                        self.competitor_at,
                    )
                    .await?;
                assert!(rotated);
            }
        }

        Ok(found)
    }

    async fn rotate(
        &self,
        id: i64,
        expected_updated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.inner
            .rotate(id, expected_updated_at, expires_at, updated_at)
            .await
    }

    async fn revoke(&self, id: i64, revoked_at: DateTime<Utc>) -> Result<bool, DomainError> {
        self.inner.revoke(id, revoked_at).await
    }

    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        revoked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        self.inner.revoke_all_for_user(user_id, revoked_at).await
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        self.inner.purge_stale(cutoff).await
    }
}

#[tokio::test]
async fn test_rotation_keeps_jti_and_moves_anchor() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo.clone(), &clock);
    let user = test_user(1);

    let first = service.generate_auth_tokens(&user, None).await.unwrap();
    let first_claims = service.verify_refresh_token(&first.refresh_token).unwrap();

    let t1 = t0() + Duration::minutes(10);
    clock.set(t1);
    let second = service
        .generate_auth_tokens(&user, Some(&first_claims))
        .await
        .unwrap();
    let second_claims = service.verify_refresh_token(&second.refresh_token).unwrap();

    assert_eq!(second_claims.jti, first_claims.jti);
    assert_eq!(second_claims.iat, t1.timestamp());
    assert_eq!(repo.len().await, 1);

    let record = repo.find_by_id(first_claims.jti).await.unwrap().unwrap();
    assert_eq!(record.created_at, t0());
    assert_eq!(record.updated_at, t1);
    assert_eq!(record.expires_at, t1 + Duration::hours(24));
}

#[tokio::test]
async fn test_replayed_refresh_token_is_already_consumed() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo.clone(), &clock);
    let user = test_user(1);

    // t0: login
    let r0 = service.generate_auth_tokens(&user, None).await.unwrap();
    let r0_claims = service.verify_refresh_token(&r0.refresh_token).unwrap();

    // t1: legitimate refresh
    let t1 = t0() + Duration::minutes(5);
    clock.set(t1);
    let r1 = service.generate_auth_tokens(&user, Some(&r0_claims)).await.unwrap();
    let r1_claims = service.verify_refresh_token(&r1.refresh_token).unwrap();

    // t2: the old token comes back
    let t2 = t0() + Duration::minutes(9);
    clock.set(t2);
    let result = service.generate_auth_tokens(&user, Some(&r0_claims)).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::AlreadyConsumed))
    ));

    // The replay did not disturb the ledger
    let record = repo.find_by_id(r0_claims.jti).await.unwrap().unwrap();
    assert_eq!(record.updated_at, t1);

    // The current token still works
    let r2 = service.generate_auth_tokens(&user, Some(&r1_claims)).await.unwrap();
    let r2_claims = service.verify_refresh_token(&r2.refresh_token).unwrap();
    assert_eq!(r2_claims.iat, t2.timestamp());
}

#[tokio::test]
async fn test_second_presentation_of_same_token_fails() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);
    let user = test_user(1);

    let pair = service.generate_auth_tokens(&user, None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();

    clock.advance(Duration::seconds(30));
    assert!(service.generate_auth_tokens(&user, Some(&claims)).await.is_ok());

    clock.advance(Duration::seconds(30));
    let result = service.generate_auth_tokens(&user, Some(&claims)).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::AlreadyConsumed))
    ));
}

#[tokio::test]
async fn test_rotation_within_the_same_second_is_rejected() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo.clone(), &clock);
    let user = test_user(1);

    let pair = service.generate_auth_tokens(&user, None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();

    // Same whole second as the issuance
    clock.advance(Duration::milliseconds(400));
    let result = service.generate_auth_tokens(&user, Some(&claims)).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::AlreadyConsumed))
    ));

    let record = repo.find_by_id(claims.jti).await.unwrap().unwrap();
    assert_eq!(record.updated_at, t0());
    assert_eq!(record.expires_at, t0() + Duration::hours(24));

    // A quick retry after a successful rotation is a replay as well
    clock.set(t0() + Duration::seconds(10));
    let rotated = service.generate_auth_tokens(&user, Some(&claims)).await.unwrap();
    let rotated_claims = service.verify_refresh_token(&rotated.refresh_token).unwrap();

    clock.advance(Duration::milliseconds(300));
    for presented in [&claims, &rotated_claims] {
        let retry = service.generate_auth_tokens(&user, Some(presented)).await;
        assert!(matches!(
            retry,
            Err(DomainError::Conflict(ConflictError::AlreadyConsumed))
        ));
    }
}

#[tokio::test]
async fn test_revoked_token_cannot_be_rotated() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);
    let user = test_user(1);

    let pair = service.generate_auth_tokens(&user, None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();
    service.revoke_refresh_token(claims.jti).await.unwrap();

    clock.advance(Duration::seconds(10));
    let result = service.generate_auth_tokens(&user, Some(&claims)).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::AlreadyRevoked))
    ));
}

#[tokio::test]
async fn test_expired_record_cannot_be_rotated() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);
    let user = test_user(1);

    let pair = service.generate_auth_tokens(&user, None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();

    clock.advance(Duration::hours(24) + Duration::seconds(1));
    let result = service.generate_auth_tokens(&user, Some(&claims)).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::Expired))
    ));
}

#[tokio::test]
async fn test_revocation_is_reported_before_expiry() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);
    let user = test_user(1);

    let pair = service.generate_auth_tokens(&user, None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();
    service.revoke_refresh_token(claims.jti).await.unwrap();

    clock.advance(Duration::days(2));
    let result = service.generate_auth_tokens(&user, Some(&claims)).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::AlreadyRevoked))
    ));
}

#[tokio::test]
async fn test_unknown_jti_is_not_found() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo.clone(), &clock);

    let claims = RefreshClaims {
        sub: 1,
        jti: 999,
        iat: t0().timestamp(),
        exp: (t0() + Duration::hours(24)).timestamp(),
    };

    let result = service.generate_auth_tokens(&test_user(1), Some(&claims)).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_rotations_have_one_winner() {
    let repo = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let service = create_test_service(repo, &clock);
    let user = test_user(1);

    let pair = service.generate_auth_tokens(&user, None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();
    clock.advance(Duration::seconds(5));

    let (a, b) = tokio::join!(
        service.generate_auth_tokens(&user, Some(&claims)),
        service.generate_auth_tokens(&user, Some(&claims)),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_rotation_losing_the_conditional_update_is_already_consumed() {
    let ledger = MockTokenRepository::new();
    let clock = ManualClock::new(t0());
    let competitor_at = t0() + Duration::seconds(3);
    let repo = InterleavingTokenRepository {
        inner: ledger.clone(),
        competitor_at,
        armed: AtomicBool::new(false),
    };
    let service = TokenService::new(repo, test_config())
        .unwrap()
        .with_clock(Arc::new(clock.clone()));
    let user = test_user(1);

    let pair = service.generate_auth_tokens(&user, None).await.unwrap();
    let claims = service.verify_refresh_token(&pair.refresh_token).unwrap();

    // The record still matches the presented token when read, and the
    // competitor moves it before the update
    clock.set(t0() + Duration::seconds(5));
    service.repository.armed.store(true, Ordering::SeqCst);
    let result = service.generate_auth_tokens(&user, Some(&claims)).await;
    assert!(matches!(
        result,
        Err(DomainError::Conflict(ConflictError::AlreadyConsumed))
    ));

    // Only the competitor's rotation is in the ledger
    let record = ledger.find_by_id(claims.jti).await.unwrap().unwrap();
    assert_eq!(record.updated_at, competitor_at);
    assert_eq!(record.expires_at, competitor_at + Duration::hours(24));
    assert!(record.revoked_at.is_none());
}
