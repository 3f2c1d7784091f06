//! Refresh token rotation.
//!
//! A presented refresh token ends in exactly one of:
//!
//! ```text
//! Presented -> Theft            already consumed once, family + account revoked
//!           -> RaceLost         a concurrent request consumed it first
//!           -> Invalidated      token version bumped since issuance
//!           -> Blocked          session awaits verification
//!           -> Rotated          new pair issued in the same family
//! ```
//!
//! The theft check and the atomic consume are two separate store calls. A
//! request that passes the theft check and then loses the compare-and-swap
//! ends as `RaceLost`, never as `Rotated`.

use crate::device::DeviceContext;
use crate::error::{SessionError, SessionResult};
use crate::hashing::hash_refresh_token;
use crate::manager::SessionManager;
use crate::session::{reasons, NewSession, Session};
use crate::token::TokenPair;
use crate::types::DbId;

/// Result of a successful rotation.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub tokens: TokenPair,
    pub session: Session,
}

impl SessionManager {
    /// Exchange a still-valid refresh token for a new pair in the same family.
    ///
    /// The old session is revoked atomically; at most one concurrent caller
    /// presenting the same token can succeed. Presenting a token that was
    /// already rotated revokes the family and every session of the user, and
    /// bumps the user's token version.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        device: DeviceContext,
    ) -> SessionResult<RotationOutcome> {
        let claims = self.codec.verify_refresh(refresh_token)?;
        let token_hash = hash_refresh_token(refresh_token);

        if self.store.find_revoked(&token_hash).await?.is_some() {
            self.respond_to_theft(claims.user_id, &claims.token_family)
                .await?;
            return Err(SessionError::TokenTheftDetected);
        }

        let consumed = self
            .store
            .find_and_revoke_atomic(&token_hash, reasons::TOKEN_ROTATED)
            .await?
            .ok_or_else(|| {
                tracing::debug!(
                    user_id = claims.user_id,
                    "Refresh token already consumed or inactive"
                );
                SessionError::SessionNotFoundOrAlreadyUsed
            })?;

        let user = self
            .users
            .find_security(consumed.user_id)
            .await?
            .ok_or(SessionError::Invalidated)?;
        if user.token_version != claims.token_version {
            tracing::warn!(
                user_id = user.user_id,
                session_id = consumed.id,
                "Refresh token version no longer matches user"
            );
            return Err(SessionError::Invalidated);
        }

        if consumed.awaits_verification() {
            tracing::info!(
                user_id = user.user_id,
                session_id = consumed.id,
                "Rotation blocked, session awaits verification"
            );
            return Err(SessionError::RequiresVerification);
        }

        let tokens =
            self.codec
                .issue_pair(user.user_id, &claims.token_family, user.token_version)?;
        let session = self
            .store
            .create_session(&NewSession {
                user_id: user.user_id,
                refresh_token_hash: hash_refresh_token(&tokens.refresh_token),
                token_family: claims.token_family,
                device,
                is_suspicious: false,
                suspicious_reason: None,
                verification_token: None,
                verification_token_expires: None,
                expires_at: tokens.refresh_expires_at,
            })
            .await?;

        tracing::debug!(
            user_id = user.user_id,
            old_session_id = consumed.id,
            session_id = session.id,
            "Refresh token rotated"
        );

        Ok(RotationOutcome { tokens, session })
    }

    /// Revoke the whole family and everything the user holds, then bump the
    /// token version so outstanding access tokens stop working too.
    async fn respond_to_theft(&self, user_id: DbId, token_family: &str) -> SessionResult<()> {
        let family_revoked = self
            .store
            .revoke_family(token_family, reasons::THEFT_FAMILY)
            .await?;

        let new_version = self.users.increment_token_version(user_id).await?;
        let user_revoked = match new_version {
            Some(_) => {
                self.store
                    .revoke_all_for_user(user_id, reasons::THEFT_ALL_SESSIONS)
                    .await?
            }
            None => 0,
        };

        tracing::warn!(
            user_id,
            family_revoked,
            user_revoked,
            token_version = ?new_version,
            "Refresh token reuse detected, revoked token family and all user sessions"
        );
        Ok(())
    }
}
