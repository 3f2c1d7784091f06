//! Listing and revoking sessions outside the rotation path.

use chrono::{Duration, Utc};

use crate::error::{SessionError, SessionResult};
use crate::hashing::hash_refresh_token;
use crate::manager::SessionManager;
use crate::session::{reasons, SessionStats, SessionView};
use crate::types::{DbId, Timestamp};

/// Minimum interval between two `last_used_at` writes for one session.
pub const LAST_USED_THROTTLE_MINS: i64 = 5;

impl SessionManager {
    /// Revoke the active session behind `refresh_token`, if any.
    ///
    /// Missing or unknown tokens are not an error.
    pub async fn logout(&self, refresh_token: Option<&str>) -> SessionResult<()> {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        let hash = hash_refresh_token(token);
        if let Some(session) = self.store.find_active_by_hash(&hash).await? {
            self.store
                .revoke_session(session.id, reasons::USER_LOGOUT)
                .await?;
            tracing::info!(user_id = session.user_id, session_id = session.id, "User logged out");
        }
        Ok(())
    }

    /// Active sessions, most recently used first, flagging the caller's own.
    pub async fn list_sessions(
        &self,
        user_id: DbId,
        current_refresh_token: Option<&str>,
    ) -> SessionResult<Vec<SessionView>> {
        let current_hash = current_refresh_token.map(hash_refresh_token);
        let mut sessions = self.store.list_active(user_id).await?;
        sessions.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(sessions
            .iter()
            .map(|s| {
                let is_current = current_hash.as_deref() == Some(s.refresh_token_hash.as_str());
                SessionView::from_session(s, is_current)
            })
            .collect())
    }

    pub async fn session_stats(&self, user_id: DbId) -> SessionResult<SessionStats> {
        let active = self.store.list_active(user_id).await?;
        Ok(SessionStats {
            active_sessions: active.len(),
            suspicious_sessions: active.iter().filter(|s| s.awaits_verification()).count(),
            max_sessions: self.limiter.max_sessions(),
        })
    }

    /// Revoke one of the user's active sessions other than the current one.
    pub async fn revoke_session(
        &self,
        user_id: DbId,
        session_id: DbId,
        current_refresh_token: Option<&str>,
    ) -> SessionResult<()> {
        let now = Utc::now();
        let session = self
            .store
            .find_for_user(session_id, user_id)
            .await?
            .filter(|s| s.is_active(now))
            .ok_or(SessionError::SessionNotFound(session_id))?;

        if current_refresh_token.map(hash_refresh_token).as_deref()
            == Some(session.refresh_token_hash.as_str())
        {
            return Err(SessionError::CannotRevokeCurrentSession);
        }

        if !self
            .store
            .revoke_session(session_id, reasons::LOGOUT_FROM_DEVICE)
            .await?
        {
            return Err(SessionError::SessionNotFound(session_id));
        }
        tracing::info!(user_id, session_id, "Session revoked by owner");
        Ok(())
    }

    pub async fn revoke_all_sessions(&self, user_id: DbId) -> SessionResult<u64> {
        let revoked = self
            .store
            .revoke_all_for_user(user_id, reasons::LOGOUT_ALL_DEVICES)
            .await?;
        tracing::info!(user_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// Revoke everything except the session behind `current_refresh_token`.
    pub async fn revoke_other_sessions(
        &self,
        user_id: DbId,
        current_refresh_token: &str,
    ) -> SessionResult<u64> {
        let keep = hash_refresh_token(current_refresh_token);
        let revoked = self
            .store
            .revoke_others(user_id, &keep, reasons::LOGOUT_OTHER_DEVICES)
            .await?;
        tracing::info!(user_id, revoked, "Other sessions revoked");
        Ok(revoked)
    }

    /// Invalidate every outstanding token of a user immediately.
    ///
    /// The version bump is what stops access tokens; the session revocation
    /// stops refresh tokens from being rotated.
    pub async fn force_logout(&self, user_id: DbId, reason: &str) -> SessionResult<u64> {
        let version = self
            .users
            .increment_token_version(user_id)
            .await?
            .ok_or(SessionError::UserNotFound(user_id))?;
        let revoked = self.store.revoke_all_for_user(user_id, reason).await?;
        tracing::warn!(user_id, token_version = version, revoked, reason, "User force logged out");
        Ok(revoked)
    }

    /// Record activity on the session behind `refresh_token`, at most once per
    /// [`LAST_USED_THROTTLE_MINS`].
    pub async fn touch_session(&self, refresh_token: &str) -> SessionResult<bool> {
        let stale_before = Utc::now() - Duration::minutes(LAST_USED_THROTTLE_MINS);
        Ok(self
            .store
            .touch_last_used(&hash_refresh_token(refresh_token), stale_before)
            .await?)
    }

    /// Forget the user's known countries and IPs; the next login sets a new baseline.
    pub async fn reset_location_baseline(&self, user_id: DbId) -> SessionResult<()> {
        self.users.clear_known_locations(user_id).await?;
        tracing::info!(user_id, "Known locations cleared");
        Ok(())
    }

    /// Delete sessions whose refresh token expired before `cutoff`.
    ///
    /// Revoked but unexpired rows are kept, since theft detection depends on them.
    pub async fn purge_expired(&self, cutoff: Timestamp) -> SessionResult<u64> {
        Ok(self.store.purge_expired(cutoff).await?)
    }
}
