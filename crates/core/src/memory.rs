//! In-process implementation of [`SessionStore`] and [`UserRepository`].
//!
//! Every operation runs under one mutex, which makes the conditional revoke in
//! `find_and_revoke_atomic` a true compare-and-swap within this process. It
//! backs the engine tests and single-process embeddings. Multi-process
//! deployments need a shared store such as the PostgreSQL one.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::session::{NewSession, Session};
use crate::store::{KnownLocationUpdate, SessionStore, UserRepository, UserSecurity};
use crate::types::{DbId, Timestamp};

#[derive(Default)]
struct Inner {
    sessions: Vec<Session>,
    users: HashMap<DbId, UserSecurity>,
    next_session_id: DbId,
}

impl Inner {
    fn revoke(session: &mut Session, reason: &str, now: Timestamp) {
        session.is_revoked = true;
        session.revoked_at = Some(now);
        session.revoked_reason = Some(reason.to_string());
    }

    fn revoke_where<F>(&mut self, reason: &str, mut pred: F) -> u64
    where
        F: FnMut(&Session) -> bool,
    {
        let now = Utc::now();
        let mut count = 0;
        for session in self.sessions.iter_mut().filter(|s| !s.is_revoked) {
            if pred(session) {
                Self::revoke(session, reason, now);
                count += 1;
            }
        }
        count
    }
}

/// Mutex-guarded session and user state owned by one instance.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with an empty location baseline.
    pub async fn insert_user(&self, user_id: DbId) -> UserSecurity {
        let user = UserSecurity {
            user_id,
            token_version: 0,
            known_countries: Vec::new(),
            known_ips: Vec::new(),
            last_login_at: None,
        };
        self.inner.lock().await.users.insert(user_id, user.clone());
        user
    }

    /// Fetch a session by id regardless of owner or state.
    pub async fn session(&self, session_id: DbId) -> Option<Session> {
        let inner = self.inner.lock().await;
        inner.sessions.iter().find(|s| s.id == session_id).cloned()
    }

    /// Apply `f` to a stored session. Used to stage expiry edge cases.
    pub async fn update_session<F>(&self, session_id: DbId, f: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        let mut inner = self.inner.lock().await;
        match inner.sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner
            .sessions
            .iter()
            .any(|s| s.refresh_token_hash == input.refresh_token_hash)
        {
            return Err(StoreError::Conflict(
                "refresh_token_hash must be unique".to_string(),
            ));
        }

        inner.next_session_id += 1;
        let now = Utc::now();
        let device = &input.device;
        let session = Session {
            id: inner.next_session_id,
            user_id: input.user_id,
            refresh_token_hash: input.refresh_token_hash.clone(),
            token_family: input.token_family.clone(),
            device_name: device.device_name.clone(),
            browser: device.browser.clone(),
            os: device.os.clone(),
            ip_address: device.ip_address.clone(),
            user_agent: device.user_agent.clone(),
            country: device.country.clone(),
            city: device.city.clone(),
            latitude: device.latitude,
            longitude: device.longitude,
            location_source: device.location_source,
            is_suspicious: input.is_suspicious,
            suspicious_reason: input.suspicious_reason.clone(),
            is_verified: input.is_verified(),
            verification_token: input.verification_token.clone(),
            verification_token_expires: input.verification_token_expires,
            created_at: now,
            last_used_at: now,
            expires_at: input.expires_at,
            is_revoked: false,
            revoked_at: None,
            revoked_reason: None,
        };
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_and_revoke_atomic(
        &self,
        refresh_token_hash: &str,
        reason: &str,
    ) -> Result<Option<Session>, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let Some(session) = inner
            .sessions
            .iter_mut()
            .find(|s| s.refresh_token_hash == refresh_token_hash && s.is_active(now))
        else {
            return Ok(None);
        };
        let before = session.clone();
        Inner::revoke(session, reason, now);
        Ok(Some(before))
    }

    async fn find_revoked(&self, refresh_token_hash: &str) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.refresh_token_hash == refresh_token_hash && s.is_revoked)
            .cloned())
    }

    async fn find_active_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.refresh_token_hash == refresh_token_hash && s.is_active(now))
            .cloned())
    }

    async fn find_for_user(
        &self,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.id == session_id && s.user_id == user_id)
            .cloned())
    }

    async fn revoke_session(&self, session_id: DbId, reason: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.revoke_where(reason, |s| s.id == session_id) > 0)
    }

    async fn revoke_sessions(
        &self,
        session_ids: &[DbId],
        reason: &str,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.revoke_where(reason, |s| session_ids.contains(&s.id)))
    }

    async fn revoke_family(&self, token_family: &str, reason: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.revoke_where(reason, |s| s.token_family == token_family))
    }

    async fn revoke_all_for_user(&self, user_id: DbId, reason: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.revoke_where(reason, |s| s.user_id == user_id))
    }

    async fn revoke_others(
        &self,
        user_id: DbId,
        keep_hash: &str,
        reason: &str,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.revoke_where(reason, |s| {
            s.user_id == user_id && s.refresh_token_hash != keep_hash
        }))
    }

    async fn list_active(&self, user_id: DbId) -> Result<Vec<Session>, StoreError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        let mut active: Vec<Session> = inner
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active(now))
            .cloned()
            .collect();
        active.sort_by_key(|s| (s.created_at, s.id));
        Ok(active)
    }

    async fn count_active(&self, user_id: DbId) -> Result<u64, StoreError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active(now))
            .count() as u64)
    }

    async fn mark_verified(
        &self,
        session_id: DbId,
        verification_token: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let target = inner.sessions.iter_mut().find(|s| {
            s.id == session_id
                && s.is_active(now)
                && s.is_suspicious
                && s.verification_token.as_deref() == Some(verification_token)
                && s.verification_token_expires.is_some_and(|expires| expires > now)
        });
        match target {
            Some(session) => {
                session.is_verified = true;
                session.verification_token = None;
                session.verification_token_expires = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn touch_last_used(
        &self,
        refresh_token_hash: &str,
        stale_before: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        match inner.sessions.iter_mut().find(|s| {
            s.refresh_token_hash == refresh_token_hash
                && s.is_active(now)
                && s.last_used_at < stale_before
        }) {
            Some(session) => {
                session.last_used_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.expires_at >= cutoff);
        Ok((before - inner.sessions.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_security(&self, user_id: DbId) -> Result<Option<UserSecurity>, StoreError> {
        Ok(self.inner.lock().await.users.get(&user_id).cloned())
    }

    async fn increment_token_version(&self, user_id: DbId) -> Result<Option<i32>, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.users.get_mut(&user_id).map(|user| {
            user.token_version += 1;
            user.token_version
        }))
    }

    async fn record_trusted_login(
        &self,
        user_id: DbId,
        update: &KnownLocationUpdate,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(user) = inner.users.get_mut(&user_id) {
            if let Some(country) = &update.add_country {
                if !user.known_countries.contains(country) {
                    user.known_countries.push(country.clone());
                }
            }
            if let Some(ip) = &update.add_ip {
                if !user.known_ips.contains(ip) {
                    user.known_ips.push(ip.clone());
                }
            }
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn clear_known_locations(&self, user_id: DbId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.known_countries.clear();
            user.known_ips.clear();
        }
        Ok(())
    }
}
