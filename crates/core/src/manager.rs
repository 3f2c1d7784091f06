//! Session lifecycle engine.
//!
//! [`SessionManager`] wires the token codec, the suspicious-login detector,
//! the session limiter and the storage contracts together. Its operations are
//! split by concern:
//!
//! - login and access-token authentication (this module)
//! - [`rotation`](crate::rotation) -- refresh token rotation and theft detection
//! - [`verification`](crate::verification) -- confirming suspicious sessions
//! - [`management`](crate::management) -- listing, revoking, force logout, janitor

use std::sync::Arc;

use chrono::Utc;

use crate::config::SessionConfig;
use crate::detector::{LoginAssessment, SuspiciousLoginDetector};
use crate::device::DeviceContext;
use crate::error::{SessionError, SessionResult};
use crate::hashing::{generate_token_family, generate_verification_token, hash_refresh_token};
use crate::limiter::SessionLimiter;
use crate::session::{NewSession, Session};
use crate::store::{SessionStore, UserRepository};
use crate::token::{TokenCodec, TokenPair};
use crate::types::DbId;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub session: Session,
    /// The session must be verified before its refresh token can be rotated.
    pub requires_verification: bool,
    /// Token to deliver out of band when verification is required.
    pub verification_token: Option<String>,
}

/// Identity proven by a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub token_version: i32,
}

/// Orchestrates every session lifecycle operation against shared storage.
///
/// Holds no mutable state of its own; all state lives in the stores.
#[derive(Clone)]
pub struct SessionManager {
    pub(crate) codec: TokenCodec,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) detector: SuspiciousLoginDetector,
    pub(crate) limiter: SessionLimiter,
    pub(crate) config: SessionConfig,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn SessionStore>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(&config),
            store,
            users,
            detector: SuspiciousLoginDetector,
            limiter: SessionLimiter::new(config.max_sessions_per_user),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create a session for an already authenticated user.
    ///
    /// Classifies the login, makes room under the session cap, issues a new
    /// token family and persists the session. Only a trusted login extends
    /// the user's known-location baseline.
    pub async fn login(&self, user_id: DbId, device: DeviceContext) -> SessionResult<LoginOutcome> {
        let user = self
            .users
            .find_security(user_id)
            .await?
            .ok_or(SessionError::UserNotFound(user_id))?;

        let assessment = self.detector.assess(&user, &device);
        if let LoginAssessment::Suspicious { reason } = &assessment {
            tracing::warn!(user_id, reason = %reason, "Suspicious login detected");
        }

        self.limiter.make_room(self.store.as_ref(), user_id).await?;

        let token_family = generate_token_family();
        let tokens = self
            .codec
            .issue_pair(user_id, &token_family, user.token_version)?;

        let (verification_token, verification_token_expires) = if assessment.is_suspicious() {
            (
                Some(generate_verification_token()),
                Some(Utc::now() + self.config.verification_token_ttl),
            )
        } else {
            (None, None)
        };

        let baseline = self.detector.baseline_update(&user, &device);
        let session = self
            .store
            .create_session(&NewSession {
                user_id,
                refresh_token_hash: hash_refresh_token(&tokens.refresh_token),
                token_family,
                device,
                is_suspicious: assessment.is_suspicious(),
                suspicious_reason: assessment.reason().map(str::to_string),
                verification_token: verification_token.clone(),
                verification_token_expires,
                expires_at: tokens.refresh_expires_at,
            })
            .await?;

        if !assessment.is_suspicious() {
            self.users.record_trusted_login(user_id, &baseline).await?;
        }

        tracing::info!(
            user_id,
            session_id = session.id,
            suspicious = session.is_suspicious,
            "Session created"
        );

        Ok(LoginOutcome {
            tokens,
            requires_verification: session.is_suspicious,
            session,
            verification_token,
        })
    }

    /// Validate an access token and check it against the user's current version.
    pub async fn authenticate(&self, access_token: &str) -> SessionResult<Principal> {
        let claims = self.codec.verify_access(access_token)?;
        let user = self
            .users
            .find_security(claims.user_id)
            .await?
            .ok_or(SessionError::InvalidToken)?;

        if user.token_version != claims.token_version {
            tracing::debug!(user_id = user.user_id, "Access token version is stale");
            return Err(SessionError::Invalidated);
        }

        Ok(Principal {
            user_id: user.user_id,
            token_version: user.token_version,
        })
    }
}
