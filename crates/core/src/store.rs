//! Persistence contracts consumed by the session engine.
//!
//! Implementations must make [`SessionStore::find_and_revoke_atomic`] a single
//! conditional update against shared storage. It is the only synchronization
//! point between concurrent requests, which may run in separate processes.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::session::{NewSession, Session};
use crate::types::{DbId, Timestamp};

/// Atomic operations over persisted session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session, returning the stored row.
    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError>;

    /// Revoke the session with this hash iff it is currently active, as one
    /// indivisible step, and return the record as it was before the update.
    ///
    /// Returns `None` when no active record matched. Under concurrent calls
    /// with the same hash exactly one caller receives `Some`.
    async fn find_and_revoke_atomic(
        &self,
        refresh_token_hash: &str,
        reason: &str,
    ) -> Result<Option<Session>, StoreError>;

    /// Locate an already revoked row with this hash.
    async fn find_revoked(&self, refresh_token_hash: &str) -> Result<Option<Session>, StoreError>;

    /// Locate an active row with this hash.
    async fn find_active_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, StoreError>;

    /// Fetch a session owned by `user_id`, in any state.
    async fn find_for_user(
        &self,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Session>, StoreError>;

    /// Revoke one session if it is not already revoked. Returns whether a row changed.
    async fn revoke_session(&self, session_id: DbId, reason: &str) -> Result<bool, StoreError>;

    /// Revoke the listed sessions that are not already revoked.
    async fn revoke_sessions(&self, session_ids: &[DbId], reason: &str)
        -> Result<u64, StoreError>;

    /// Revoke every member of a token family.
    async fn revoke_family(&self, token_family: &str, reason: &str) -> Result<u64, StoreError>;

    /// Revoke every non-revoked session of a user.
    async fn revoke_all_for_user(&self, user_id: DbId, reason: &str) -> Result<u64, StoreError>;

    /// Revoke every non-revoked session of a user except the one with `keep_hash`.
    async fn revoke_others(
        &self,
        user_id: DbId,
        keep_hash: &str,
        reason: &str,
    ) -> Result<u64, StoreError>;

    /// Active sessions of a user, oldest `created_at` first.
    async fn list_active(&self, user_id: DbId) -> Result<Vec<Session>, StoreError>;

    /// Number of active sessions of a user.
    async fn count_active(&self, user_id: DbId) -> Result<u64, StoreError>;

    /// Set `is_verified` and clear the verification token and expiry, in one
    /// step and only while the session is active, suspicious and still holds
    /// an unexpired `verification_token`. Returns `false` when any of that no
    /// longer holds.
    async fn mark_verified(
        &self,
        session_id: DbId,
        verification_token: &str,
    ) -> Result<bool, StoreError>;

    /// Bump `last_used_at` on the active session with this hash, but only if it
    /// was last touched before `stale_before`.
    async fn touch_last_used(
        &self,
        refresh_token_hash: &str,
        stale_before: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Delete rows that expired before `cutoff`.
    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64, StoreError>;
}

/// Security-relevant slice of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSecurity {
    pub user_id: DbId,
    pub token_version: i32,
    pub known_countries: Vec<String>,
    pub known_ips: Vec<String>,
    pub last_login_at: Option<Timestamp>,
}

/// Additions to a user's known-location baseline after a trusted login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownLocationUpdate {
    pub add_country: Option<String>,
    pub add_ip: Option<String>,
}

/// User account capabilities the engine needs. The account itself is owned elsewhere.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_security(&self, user_id: DbId) -> Result<Option<UserSecurity>, StoreError>;

    /// Increment `token_version`, returning the new value (`None` if the user is gone).
    async fn increment_token_version(&self, user_id: DbId) -> Result<Option<i32>, StoreError>;

    /// Merge the update into the known sets and set `last_login_at = now`.
    async fn record_trusted_login(
        &self,
        user_id: DbId,
        update: &KnownLocationUpdate,
    ) -> Result<(), StoreError>;

    /// Forget all known countries and IPs so the next login sets a new baseline.
    async fn clear_known_locations(&self, user_id: DbId) -> Result<(), StoreError>;
}
