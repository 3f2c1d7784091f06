//! Promoting a suspicious session to verified.

use chrono::Utc;

use crate::error::{SessionResult, VerificationFailure};
use crate::manager::SessionManager;
use crate::session::Session;
use crate::types::DbId;

impl SessionManager {
    /// Confirm a suspicious session with the token delivered out of band.
    ///
    /// The session must belong to `user_id`, be active and be flagged
    /// suspicious. A mismatched or expired token leaves it untouched.
    pub async fn verify_session(
        &self,
        session_id: DbId,
        verification_token: &str,
        user_id: DbId,
    ) -> SessionResult<Session> {
        let now = Utc::now();
        let mut session = self
            .store
            .find_for_user(session_id, user_id)
            .await?
            .filter(|s| s.is_active(now))
            .ok_or(VerificationFailure::NotFound)?;

        if !session.is_suspicious {
            return Err(VerificationFailure::NotSuspicious.into());
        }

        if session.verification_token.as_deref() != Some(verification_token) {
            tracing::warn!(user_id, session_id, "Verification token mismatch");
            return Err(VerificationFailure::InvalidToken.into());
        }

        match session.verification_token_expires {
            Some(expires) if now < expires => {}
            _ => return Err(VerificationFailure::Expired.into()),
        }

        if !self.store.mark_verified(session_id, verification_token).await? {
            tracing::warn!(user_id, session_id, "Session changed before it could be verified");
            return Err(VerificationFailure::NotFound.into());
        }

        session.is_verified = true;
        session.verification_token = None;
        session.verification_token_expires = None;

        tracing::info!(user_id, session_id, "Suspicious session verified");
        Ok(session)
    }
}
