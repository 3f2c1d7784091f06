//! Per-user cap on concurrently active sessions.

use crate::error::StoreError;
use crate::session::{reasons, Session};
use crate::store::SessionStore;
use crate::types::DbId;

/// Evicts a user's oldest sessions so a new one fits under the cap.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimiter {
    max_sessions: usize,
}

impl SessionLimiter {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Sessions to evict from `active` (sorted oldest first) before inserting one more.
    ///
    /// At or above the cap this is the oldest `len - max + 1` sessions, so the
    /// count after insertion is exactly `max`.
    pub fn select_evictions<'a>(&self, active: &'a [Session]) -> &'a [Session] {
        if active.len() < self.max_sessions {
            return &[];
        }
        &active[..active.len() - self.max_sessions + 1]
    }

    /// Revoke the oldest sessions of `user_id` as needed. Must run before the
    /// new session is persisted. Returns how many were revoked.
    pub async fn make_room(
        &self,
        store: &dyn SessionStore,
        user_id: DbId,
    ) -> Result<u64, StoreError> {
        let active = store.list_active(user_id).await?;
        let evict: Vec<DbId> = self.select_evictions(&active).iter().map(|s| s.id).collect();
        if evict.is_empty() {
            return Ok(0);
        }

        let revoked = store
            .revoke_sessions(&evict, reasons::SESSION_LIMIT_EXCEEDED)
            .await?;
        tracing::info!(
            user_id,
            revoked,
            max_sessions = self.max_sessions,
            "Session limit reached, revoked oldest sessions"
        );
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::device::LocationSource;

    fn session(id: DbId) -> Session {
        let now = Utc::now();
        Session {
            id,
            user_id: 1,
            refresh_token_hash: format!("hash-{id}"),
            token_family: "fam".into(),
            device_name: "Desktop".into(),
            browser: "Firefox".into(),
            os: "Linux".into(),
            ip_address: "203.0.113.7".into(),
            user_agent: None,
            country: "DE".into(),
            city: "Berlin".into(),
            latitude: None,
            longitude: None,
            location_source: LocationSource::Ip,
            is_suspicious: false,
            suspicious_reason: None,
            is_verified: true,
            verification_token: None,
            verification_token_expires: None,
            created_at: now + Duration::seconds(id),
            last_used_at: now,
            expires_at: now + Duration::days(7),
            is_revoked: false,
            revoked_at: None,
            revoked_reason: None,
        }
    }

    #[test]
    fn below_cap_evicts_nothing() {
        let active = vec![session(1), session(2)];
        assert!(SessionLimiter::new(3).select_evictions(&active).is_empty());
    }

    #[test]
    fn at_cap_evicts_oldest_one() {
        let active = vec![session(1), session(2), session(3)];
        let evicted = SessionLimiter::new(3).select_evictions(&active);
        assert_eq!(evicted.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn over_cap_evicts_down_to_room_for_one() {
        let active: Vec<Session> = (1..=5).map(session).collect();
        let evicted = SessionLimiter::new(2).select_evictions(&active);
        assert_eq!(evicted.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }
}
