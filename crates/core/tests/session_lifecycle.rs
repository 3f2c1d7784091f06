//! End-to-end lifecycle tests for the session engine on the in-memory store.
//!
//! Covers login classification, the session cap, rotation, theft detection,
//! concurrent duplicate rotation, verification and session management.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Barrier;

use tessera_core::config::SessionConfig;
use tessera_core::device::{DeviceContext, LocationCapture, LocationSource, LOCAL};
use tessera_core::error::{SessionError, StoreError, VerificationFailure};
use tessera_core::hashing::hash_refresh_token;
use tessera_core::manager::SessionManager;
use tessera_core::memory::MemoryStore;
use tessera_core::session::{reasons, NewSession, Session};
use tessera_core::store::{SessionStore, UserRepository};
use tessera_core::types::{DbId, Timestamp};

const USER: DbId = 1;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config() -> SessionConfig {
    SessionConfig::new(
        "access-secret-for-lifecycle-tests",
        "refresh-secret-for-lifecycle-tests",
    )
}

async fn setup() -> (SessionManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.insert_user(USER).await;
    let manager = SessionManager::new(config(), store.clone(), store.clone());
    (manager, store)
}

fn berlin() -> DeviceContext {
    DeviceContext::from_ip("203.0.113.7").with_country("DE")
}

fn sao_paulo() -> DeviceContext {
    DeviceContext::from_ip("198.51.100.20").with_country("BR")
}

// ---------------------------------------------------------------------------
// Login and suspicious-login classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_login_is_trusted_and_sets_baseline() {
    let (manager, store) = setup().await;

    let outcome = manager.login(USER, sao_paulo()).await.unwrap();

    assert!(!outcome.requires_verification);
    assert!(outcome.verification_token.is_none());
    assert!(outcome.session.is_verified);
    assert_eq!(
        outcome.session.refresh_token_hash,
        hash_refresh_token(&outcome.tokens.refresh_token)
    );

    let user = store.find_security(USER).await.unwrap().unwrap();
    assert_eq!(user.known_countries, vec!["BR".to_string()]);
    assert_eq!(user.known_ips, vec!["198.51.100.20".to_string()]);
    assert!(user.last_login_at.is_some());
}

#[tokio::test]
async fn login_from_new_country_is_flagged() {
    let (manager, store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();

    let outcome = manager.login(USER, sao_paulo()).await.unwrap();

    assert!(outcome.requires_verification);
    assert!(outcome.session.is_suspicious);
    assert!(!outcome.session.is_verified);
    assert!(outcome
        .session
        .suspicious_reason
        .as_deref()
        .unwrap()
        .contains("BR"));
    let token = outcome.verification_token.expect("verification token issued");
    assert_eq!(outcome.session.verification_token.as_deref(), Some(token.as_str()));
    let expires = outcome.session.verification_token_expires.unwrap();
    assert!(expires > Utc::now() + Duration::hours(23));

    // The flagged login must not extend the baseline.
    let user = store.find_security(USER).await.unwrap().unwrap();
    assert_eq!(user.known_countries, vec!["DE".to_string()]);
    assert_eq!(user.known_ips, vec!["203.0.113.7".to_string()]);
}

#[tokio::test]
async fn login_from_new_ip_range_is_flagged() {
    let (manager, _store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();

    let outcome = manager
        .login(USER, DeviceContext::from_ip("192.0.2.1").with_country("DE"))
        .await
        .unwrap();

    assert_eq!(
        outcome.session.suspicious_reason.as_deref(),
        Some("new IP range: 192.0.2.1")
    );
}

#[tokio::test]
async fn trusted_login_from_known_range_adds_nothing() {
    let (manager, store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();

    let outcome = manager
        .login(USER, DeviceContext::from_ip("203.0.113.99").with_country(LOCAL))
        .await
        .unwrap();

    assert!(!outcome.requires_verification);
    let user = store.find_security(USER).await.unwrap().unwrap();
    assert_eq!(user.known_ips.len(), 1);
    assert_eq!(user.known_countries.len(), 1);
}

#[tokio::test]
async fn gps_location_is_recorded_for_that_session_only() {
    let (manager, _store) = setup().await;

    let gps = berlin().with_location(LocationCapture::GpsProvided {
        latitude: 52.52,
        longitude: 13.405,
    });
    let first = manager.login(USER, gps).await.unwrap();
    let second = manager.login(USER, berlin()).await.unwrap();

    assert_eq!(first.session.location_source, LocationSource::Gps);
    assert_eq!(first.session.latitude, Some(52.52));
    assert_eq!(second.session.location_source, LocationSource::Ip);
    assert_eq!(second.session.latitude, None);
}

#[tokio::test]
async fn login_for_unknown_user_fails() {
    let (manager, _store) = setup().await;
    assert_matches!(
        manager.login(99, berlin()).await,
        Err(SessionError::UserNotFound(99))
    );
}

#[tokio::test]
async fn reset_baseline_makes_next_login_trusted() {
    let (manager, _store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();
    manager.reset_location_baseline(USER).await.unwrap();

    let outcome = manager.login(USER, sao_paulo()).await.unwrap();
    assert!(!outcome.requires_verification);
}

// ---------------------------------------------------------------------------
// Session limit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fourth_login_evicts_exactly_the_oldest_session() {
    let (manager, store) = setup().await;

    let t1 = manager.login(USER, berlin()).await.unwrap().session;
    let t2 = manager.login(USER, berlin()).await.unwrap().session;
    let t3 = manager.login(USER, berlin()).await.unwrap().session;
    assert_eq!(store.count_active(USER).await.unwrap(), 3);

    let t4 = manager.login(USER, berlin()).await.unwrap().session;

    let active: Vec<DbId> = store
        .list_active(USER)
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(active, vec![t2.id, t3.id, t4.id]);

    let evicted = store.session(t1.id).await.unwrap();
    assert!(evicted.is_revoked);
    assert_eq!(
        evicted.revoked_reason.as_deref(),
        Some(reasons::SESSION_LIMIT_EXCEEDED)
    );
}

#[tokio::test]
async fn active_count_never_exceeds_cap() {
    let store = Arc::new(MemoryStore::new());
    store.insert_user(USER).await;
    let manager = SessionManager::new(config().with_max_sessions(2), store.clone(), store.clone());

    for _ in 0..6 {
        manager.login(USER, berlin()).await.unwrap();
        assert!(store.count_active(USER).await.unwrap() <= 2);
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rotation_issues_new_pair_in_same_family() {
    let (manager, store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();

    let rotated = manager
        .rotate(&login.tokens.refresh_token, berlin())
        .await
        .unwrap();

    assert_ne!(rotated.tokens.refresh_token, login.tokens.refresh_token);
    assert_eq!(rotated.session.token_family, login.session.token_family);
    assert!(!rotated.session.is_suspicious);
    assert!(rotated.session.is_verified);

    let claims = manager
        .codec()
        .verify_refresh(&rotated.tokens.refresh_token)
        .unwrap();
    assert_eq!(claims.token_family, login.session.token_family);

    let old = store.session(login.session.id).await.unwrap();
    assert!(old.is_revoked);
    assert_eq!(old.revoked_reason.as_deref(), Some(reasons::TOKEN_ROTATED));
    assert_eq!(store.count_active(USER).await.unwrap(), 1);
}

#[tokio::test]
async fn rotation_chain_keeps_family() {
    let (manager, _store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();

    let mut token = login.tokens.refresh_token;
    for _ in 0..3 {
        let rotated = manager.rotate(&token, berlin()).await.unwrap();
        assert_eq!(rotated.session.token_family, login.session.token_family);
        token = rotated.tokens.refresh_token;
    }
}

#[tokio::test]
async fn reused_refresh_token_triggers_theft_response() {
    let (manager, store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();
    let other_device = manager.login(USER, berlin()).await.unwrap();
    manager
        .rotate(&login.tokens.refresh_token, berlin())
        .await
        .unwrap();

    let replay = manager.rotate(&login.tokens.refresh_token, berlin()).await;

    assert_matches!(replay, Err(SessionError::TokenTheftDetected));
    assert_eq!(store.count_active(USER).await.unwrap(), 0);
    assert_eq!(store.find_security(USER).await.unwrap().unwrap().token_version, 1);

    // Every outstanding access token stops working.
    assert_matches!(
        manager.authenticate(&other_device.tokens.access_token).await,
        Err(SessionError::Invalidated)
    );
}

#[tokio::test]
async fn concurrent_duplicate_rotation_has_one_winner_and_no_theft() {
    let inner = Arc::new(MemoryStore::new());
    inner.insert_user(USER).await;
    let lockstep = Arc::new(LockstepStore::new(inner.clone(), 2));
    let manager = SessionManager::new(config(), lockstep, inner.clone());

    let login = manager.login(USER, berlin()).await.unwrap();
    let token = login.tokens.refresh_token.clone();

    let (a, b) = tokio::join!(
        manager.rotate(&token, berlin()),
        manager.rotate(&token, berlin())
    );

    let results = [a, b];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one rotation must succeed");
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(SessionError::SessionNotFoundOrAlreadyUsed))));

    // No theft cascade.
    assert_eq!(inner.find_security(USER).await.unwrap().unwrap().token_version, 0);
    assert_eq!(inner.count_active(USER).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn atomic_consume_has_single_winner_across_tasks() {
    let store = Arc::new(MemoryStore::new());
    store.insert_user(USER).await;
    let manager = SessionManager::new(config(), store.clone(), store.clone());
    let login = manager.login(USER, berlin()).await.unwrap();
    let hash = login.session.refresh_token_hash.clone();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let hash = hash.clone();
        handles.push(tokio::spawn(async move {
            store
                .find_and_revoke_atomic(&hash, reasons::TOKEN_ROTATED)
                .await
                .unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if let Some(before) = handle.await.unwrap() {
            assert!(!before.is_revoked, "winner must see the pre-update record");
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn version_bump_between_issue_and_rotation_invalidates() {
    let (manager, store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();
    store.increment_token_version(USER).await.unwrap();

    assert_matches!(
        manager.rotate(&login.tokens.refresh_token, berlin()).await,
        Err(SessionError::Invalidated)
    );
}

#[tokio::test]
async fn suspicious_session_cannot_rotate_before_verification() {
    let (manager, store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();
    let flagged = manager.login(USER, sao_paulo()).await.unwrap();

    assert_matches!(
        manager.rotate(&flagged.tokens.refresh_token, sao_paulo()).await,
        Err(SessionError::RequiresVerification)
    );
    // The attempt consumed the session.
    assert!(store.session(flagged.session.id).await.unwrap().is_revoked);
}

#[tokio::test]
async fn expired_session_is_not_consumable() {
    let (manager, store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();
    store
        .update_session(login.session.id, |s| {
            s.expires_at = Utc::now() - Duration::seconds(1)
        })
        .await;

    assert_matches!(
        manager.rotate(&login.tokens.refresh_token, berlin()).await,
        Err(SessionError::SessionNotFoundOrAlreadyUsed)
    );
}

#[tokio::test]
async fn malformed_or_wrong_kind_tokens_are_rejected() {
    let (manager, _store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();

    assert_matches!(
        manager.rotate("garbage", berlin()).await,
        Err(SessionError::InvalidToken)
    );
    assert_matches!(
        manager.rotate(&login.tokens.access_token, berlin()).await,
        Err(SessionError::InvalidToken)
    );
    assert_matches!(
        manager.authenticate(&login.tokens.refresh_token).await,
        Err(SessionError::InvalidToken)
    );
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verified_session_can_rotate_from_then_on() {
    let (manager, _store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();
    let flagged = manager.login(USER, sao_paulo()).await.unwrap();
    let token = flagged.verification_token.clone().unwrap();

    let verified = manager
        .verify_session(flagged.session.id, &token, USER)
        .await
        .unwrap();
    assert!(verified.is_verified);
    assert!(verified.verification_token.is_none());

    let first = manager
        .rotate(&flagged.tokens.refresh_token, sao_paulo())
        .await
        .unwrap();
    manager
        .rotate(&first.tokens.refresh_token, sao_paulo())
        .await
        .unwrap();
}

#[tokio::test]
async fn mismatched_verification_token_is_rejected() {
    let (manager, store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();
    let flagged = manager.login(USER, sao_paulo()).await.unwrap();

    assert_matches!(
        manager.verify_session(flagged.session.id, "wrong", USER).await,
        Err(SessionError::Verification(VerificationFailure::InvalidToken))
    );
    assert!(!store.session(flagged.session.id).await.unwrap().is_verified);
}

#[tokio::test]
async fn expired_verification_token_is_rejected() {
    let (manager, store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();
    let flagged = manager.login(USER, sao_paulo()).await.unwrap();
    store
        .update_session(flagged.session.id, |s| {
            s.verification_token_expires = Some(Utc::now() - Duration::minutes(1))
        })
        .await;

    let token = flagged.verification_token.unwrap();
    assert_matches!(
        manager.verify_session(flagged.session.id, &token, USER).await,
        Err(SessionError::Verification(VerificationFailure::Expired))
    );
    assert!(!store.session(flagged.session.id).await.unwrap().is_verified);
}

#[tokio::test]
async fn verification_requires_suspicious_owned_active_session() {
    let (manager, store) = setup().await;
    store.insert_user(2).await;
    let trusted = manager.login(USER, berlin()).await.unwrap();
    let flagged = manager.login(USER, sao_paulo()).await.unwrap();
    let token = flagged.verification_token.clone().unwrap();

    assert_matches!(
        manager.verify_session(trusted.session.id, "anything", USER).await,
        Err(SessionError::Verification(VerificationFailure::NotSuspicious))
    );
    assert_matches!(
        manager.verify_session(flagged.session.id, &token, 2).await,
        Err(SessionError::Verification(VerificationFailure::NotFound))
    );

    manager.revoke_all_sessions(USER).await.unwrap();
    assert_matches!(
        manager.verify_session(flagged.session.id, &token, USER).await,
        Err(SessionError::Verification(VerificationFailure::NotFound))
    );
}

#[tokio::test]
async fn revoke_racing_verification_wins() {
    let inner = Arc::new(MemoryStore::new());
    inner.insert_user(USER).await;
    let manager = SessionManager::new(config(), inner.clone(), inner.clone());
    manager.login(USER, berlin()).await.unwrap();
    let flagged = manager.login(USER, sao_paulo()).await.unwrap();
    let token = flagged.verification_token.clone().unwrap();

    let racing = SessionManager::new(
        config(),
        Arc::new(LockstepStore::revoking_after_read(inner.clone())),
        inner.clone(),
    );
    assert_matches!(
        racing.verify_session(flagged.session.id, &token, USER).await,
        Err(SessionError::Verification(VerificationFailure::NotFound))
    );

    let stored = inner.session(flagged.session.id).await.unwrap();
    assert!(stored.is_revoked);
    assert!(!stored.is_verified);
    assert_eq!(stored.verification_token.as_deref(), Some(token.as_str()));
}

// ---------------------------------------------------------------------------
// Session management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_accepts_current_access_token() {
    let (manager, _store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();

    let principal = manager.authenticate(&login.tokens.access_token).await.unwrap();
    assert_eq!(principal.user_id, USER);
    assert_eq!(principal.token_version, 0);
}

#[tokio::test]
async fn force_logout_invalidates_everything() {
    let (manager, store) = setup().await;
    let a = manager.login(USER, berlin()).await.unwrap();
    manager.login(USER, berlin()).await.unwrap();

    let revoked = manager.force_logout(USER, "Admin force logout").await.unwrap();

    assert_eq!(revoked, 2);
    assert_eq!(store.count_active(USER).await.unwrap(), 0);
    assert_matches!(
        manager.authenticate(&a.tokens.access_token).await,
        Err(SessionError::Invalidated)
    );
}

#[tokio::test]
async fn logout_revokes_only_that_session() {
    let (manager, store) = setup().await;
    let a = manager.login(USER, berlin()).await.unwrap();
    let b = manager.login(USER, berlin()).await.unwrap();

    manager.logout(Some(&a.tokens.refresh_token)).await.unwrap();
    manager.logout(None).await.unwrap();
    manager.logout(Some("unknown")).await.unwrap();

    let revoked = store.session(a.session.id).await.unwrap();
    assert_eq!(revoked.revoked_reason.as_deref(), Some(reasons::USER_LOGOUT));
    assert!(!store.session(b.session.id).await.unwrap().is_revoked);
}

#[tokio::test]
async fn listing_flags_current_session_and_hides_revoked() {
    let (manager, _store) = setup().await;
    let a = manager.login(USER, berlin()).await.unwrap();
    let b = manager.login(USER, berlin()).await.unwrap();
    manager.logout(Some(&a.tokens.refresh_token)).await.unwrap();
    let c = manager.login(USER, berlin()).await.unwrap();

    let views = manager
        .list_sessions(USER, Some(&c.tokens.refresh_token))
        .await
        .unwrap();

    let ids: Vec<DbId> = views.iter().map(|v| v.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&b.session.id));
    assert!(views.iter().any(|v| v.id == c.session.id && v.is_current));
    assert!(views.iter().any(|v| v.id == b.session.id && !v.is_current));
}

#[tokio::test]
async fn stats_count_unverified_suspicious_sessions() {
    let (manager, _store) = setup().await;
    manager.login(USER, berlin()).await.unwrap();
    manager.login(USER, sao_paulo()).await.unwrap();

    let stats = manager.session_stats(USER).await.unwrap();
    assert_eq!(stats.active_sessions, 2);
    assert_eq!(stats.suspicious_sessions, 1);
    assert_eq!(stats.max_sessions, 3);
}

#[tokio::test]
async fn revoking_current_session_is_refused() {
    let (manager, _store) = setup().await;
    let a = manager.login(USER, berlin()).await.unwrap();
    let b = manager.login(USER, berlin()).await.unwrap();

    assert_matches!(
        manager
            .revoke_session(USER, a.session.id, Some(&a.tokens.refresh_token))
            .await,
        Err(SessionError::CannotRevokeCurrentSession)
    );
    manager
        .revoke_session(USER, b.session.id, Some(&a.tokens.refresh_token))
        .await
        .unwrap();
    assert_matches!(
        manager.revoke_session(USER, b.session.id, None).await,
        Err(SessionError::SessionNotFound(_))
    );
}

#[tokio::test]
async fn revoke_others_keeps_current() {
    let (manager, store) = setup().await;
    let current = manager.login(USER, berlin()).await.unwrap();
    manager.login(USER, berlin()).await.unwrap();
    manager.login(USER, berlin()).await.unwrap();

    let revoked = manager
        .revoke_other_sessions(USER, &current.tokens.refresh_token)
        .await
        .unwrap();

    assert_eq!(revoked, 2);
    let active = store.list_active(USER).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, current.session.id);
}

#[tokio::test]
async fn touch_is_throttled() {
    let (manager, store) = setup().await;
    let login = manager.login(USER, berlin()).await.unwrap();

    assert!(!manager.touch_session(&login.tokens.refresh_token).await.unwrap());

    store
        .update_session(login.session.id, |s| {
            s.last_used_at = Utc::now() - Duration::minutes(10)
        })
        .await;
    assert!(manager.touch_session(&login.tokens.refresh_token).await.unwrap());
}

#[tokio::test]
async fn purge_removes_only_expired_rows() {
    let (manager, store) = setup().await;
    let old = manager.login(USER, berlin()).await.unwrap();
    let rotated_from = manager.login(USER, berlin()).await.unwrap();
    manager
        .rotate(&rotated_from.tokens.refresh_token, berlin())
        .await
        .unwrap();
    store
        .update_session(old.session.id, |s| {
            s.expires_at = Utc::now() - Duration::days(1)
        })
        .await;

    let purged = manager.purge_expired(Utc::now()).await.unwrap();

    assert_eq!(purged, 1);
    assert!(store.session(old.session.id).await.is_none());
    // Revoked but unexpired rows stay for theft detection.
    assert!(store.session(rotated_from.session.id).await.is_some());
}

// ---------------------------------------------------------------------------
// Lockstep store
// ---------------------------------------------------------------------------

/// Delegating store that holds every `find_revoked` caller at a barrier, so
/// concurrent rotations all pass the theft check before any of them consumes.
///
/// With `revoke_after_read` set, every `find_for_user` is followed by a
/// revoke of all the user's sessions, landing between a read and its write.
struct LockstepStore {
    inner: Arc<MemoryStore>,
    barrier: Barrier,
    revoke_after_read: bool,
}

impl LockstepStore {
    fn new(inner: Arc<MemoryStore>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
            revoke_after_read: false,
        }
    }

    fn revoking_after_read(inner: Arc<MemoryStore>) -> Self {
        Self {
            revoke_after_read: true,
            ..Self::new(inner, 1)
        }
    }
}

#[async_trait]
impl SessionStore for LockstepStore {
    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        self.inner.create_session(input).await
    }

    async fn find_and_revoke_atomic(
        &self,
        hash: &str,
        reason: &str,
    ) -> Result<Option<Session>, StoreError> {
        self.inner.find_and_revoke_atomic(hash, reason).await
    }

    async fn find_revoked(&self, hash: &str) -> Result<Option<Session>, StoreError> {
        let found = self.inner.find_revoked(hash).await;
        self.barrier.wait().await;
        found
    }

    async fn find_active_by_hash(&self, hash: &str) -> Result<Option<Session>, StoreError> {
        self.inner.find_active_by_hash(hash).await
    }

    async fn find_for_user(
        &self,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Session>, StoreError> {
        let found = self.inner.find_for_user(session_id, user_id).await;
        if self.revoke_after_read {
            self.inner
                .revoke_all_for_user(user_id, reasons::LOGOUT_ALL_DEVICES)
                .await?;
        }
        found
    }

    async fn revoke_session(&self, session_id: DbId, reason: &str) -> Result<bool, StoreError> {
        self.inner.revoke_session(session_id, reason).await
    }

    async fn revoke_sessions(&self, ids: &[DbId], reason: &str) -> Result<u64, StoreError> {
        self.inner.revoke_sessions(ids, reason).await
    }

    async fn revoke_family(&self, family: &str, reason: &str) -> Result<u64, StoreError> {
        self.inner.revoke_family(family, reason).await
    }

    async fn revoke_all_for_user(&self, user_id: DbId, reason: &str) -> Result<u64, StoreError> {
        self.inner.revoke_all_for_user(user_id, reason).await
    }

    async fn revoke_others(
        &self,
        user_id: DbId,
        keep_hash: &str,
        reason: &str,
    ) -> Result<u64, StoreError> {
        self.inner.revoke_others(user_id, keep_hash, reason).await
    }

    async fn list_active(&self, user_id: DbId) -> Result<Vec<Session>, StoreError> {
        self.inner.list_active(user_id).await
    }

    async fn count_active(&self, user_id: DbId) -> Result<u64, StoreError> {
        self.inner.count_active(user_id).await
    }

    async fn mark_verified(
        &self,
        session_id: DbId,
        verification_token: &str,
    ) -> Result<bool, StoreError> {
        self.inner.mark_verified(session_id, verification_token).await
    }

    async fn touch_last_used(
        &self,
        hash: &str,
        stale_before: Timestamp,
    ) -> Result<bool, StoreError> {
        self.inner.touch_last_used(hash, stale_before).await
    }

    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        self.inner.purge_expired(cutoff).await
    }
}
