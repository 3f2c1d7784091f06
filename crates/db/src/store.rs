//! PostgreSQL-backed implementation of the session engine's storage contracts.

use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::error::StoreError;
use tessera_core::session::{NewSession, Session};
use tessera_core::store::{KnownLocationUpdate, SessionStore, UserRepository, UserSecurity};
use tessera_core::types::{DbId, Timestamp};

use crate::repositories::{SessionRepo, UserRepo};

/// Adapter over [`SessionRepo`] and [`UserRepo`] sharing one pool.
///
/// Safe to run from any number of processes against the same database:
/// rotation races are settled by the conditional `UPDATE` in
/// [`SessionRepo::find_and_revoke_atomic`].
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        SessionRepo::create(&self.pool, input)
            .await
            .map(Session::from)
            .map_err(StoreError::backend)
    }

    async fn find_and_revoke_atomic(
        &self,
        refresh_token_hash: &str,
        reason: &str,
    ) -> Result<Option<Session>, StoreError> {
        SessionRepo::find_and_revoke_atomic(&self.pool, refresh_token_hash, reason)
            .await
            .map(|row| row.map(Session::from))
            .map_err(StoreError::backend)
    }

    async fn find_revoked(&self, refresh_token_hash: &str) -> Result<Option<Session>, StoreError> {
        SessionRepo::find_revoked(&self.pool, refresh_token_hash)
            .await
            .map(|row| row.map(Session::from))
            .map_err(StoreError::backend)
    }

    async fn find_active_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, StoreError> {
        SessionRepo::find_active_by_hash(&self.pool, refresh_token_hash)
            .await
            .map(|row| row.map(Session::from))
            .map_err(StoreError::backend)
    }

    async fn find_for_user(
        &self,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Session>, StoreError> {
        SessionRepo::find_for_user(&self.pool, session_id, user_id)
            .await
            .map(|row| row.map(Session::from))
            .map_err(StoreError::backend)
    }

    async fn revoke_session(&self, session_id: DbId, reason: &str) -> Result<bool, StoreError> {
        SessionRepo::revoke(&self.pool, session_id, reason)
            .await
            .map_err(StoreError::backend)
    }

    async fn revoke_sessions(
        &self,
        session_ids: &[DbId],
        reason: &str,
    ) -> Result<u64, StoreError> {
        SessionRepo::revoke_many(&self.pool, session_ids, reason)
            .await
            .map_err(StoreError::backend)
    }

    async fn revoke_family(&self, token_family: &str, reason: &str) -> Result<u64, StoreError> {
        SessionRepo::revoke_family(&self.pool, token_family, reason)
            .await
            .map_err(StoreError::backend)
    }

    async fn revoke_all_for_user(&self, user_id: DbId, reason: &str) -> Result<u64, StoreError> {
        SessionRepo::revoke_all_for_user(&self.pool, user_id, reason)
            .await
            .map_err(StoreError::backend)
    }

    async fn revoke_others(
        &self,
        user_id: DbId,
        keep_hash: &str,
        reason: &str,
    ) -> Result<u64, StoreError> {
        SessionRepo::revoke_others(&self.pool, user_id, keep_hash, reason)
            .await
            .map_err(StoreError::backend)
    }

    async fn list_active(&self, user_id: DbId) -> Result<Vec<Session>, StoreError> {
        SessionRepo::list_active(&self.pool, user_id)
            .await
            .map(|rows| rows.into_iter().map(Session::from).collect())
            .map_err(StoreError::backend)
    }

    async fn count_active(&self, user_id: DbId) -> Result<u64, StoreError> {
        SessionRepo::count_active(&self.pool, user_id)
            .await
            .map(|count| count.max(0) as u64)
            .map_err(StoreError::backend)
    }

    async fn mark_verified(
        &self,
        session_id: DbId,
        verification_token: &str,
    ) -> Result<bool, StoreError> {
        SessionRepo::mark_verified(&self.pool, session_id, verification_token)
            .await
            .map_err(StoreError::backend)
    }

    async fn touch_last_used(
        &self,
        refresh_token_hash: &str,
        stale_before: Timestamp,
    ) -> Result<bool, StoreError> {
        SessionRepo::touch_last_used(&self.pool, refresh_token_hash, stale_before)
            .await
            .map_err(StoreError::backend)
    }

    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        SessionRepo::delete_expired(&self.pool, cutoff)
            .await
            .map_err(StoreError::backend)
    }
}

#[async_trait]
impl UserRepository for PgSessionStore {
    async fn find_security(&self, user_id: DbId) -> Result<Option<UserSecurity>, StoreError> {
        UserRepo::find_by_id(&self.pool, user_id)
            .await
            .map(|user| user.map(UserSecurity::from))
            .map_err(StoreError::backend)
    }

    async fn increment_token_version(&self, user_id: DbId) -> Result<Option<i32>, StoreError> {
        UserRepo::increment_token_version(&self.pool, user_id)
            .await
            .map_err(StoreError::backend)
    }

    async fn record_trusted_login(
        &self,
        user_id: DbId,
        update: &KnownLocationUpdate,
    ) -> Result<(), StoreError> {
        UserRepo::record_trusted_login(
            &self.pool,
            user_id,
            update.add_country.as_deref(),
            update.add_ip.as_deref(),
        )
        .await
        .map_err(StoreError::backend)
    }

    async fn clear_known_locations(&self, user_id: DbId) -> Result<(), StoreError> {
        UserRepo::clear_known_locations(&self.pool, user_id)
            .await
            .map_err(StoreError::backend)
    }
}
