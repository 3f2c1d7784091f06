use crate::types::DbId;

/// Failure raised by a [`SessionStore`](crate::store::SessionStore) or
/// [`UserRepository`](crate::store::UserRepository) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Storage conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Wrap any backend error (e.g. `sqlx::Error`).
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// Reason a session verification attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationFailure {
    #[error("session not found")]
    NotFound,

    #[error("session does not require verification")]
    NotSuspicious,

    #[error("invalid verification token")]
    InvalidToken,

    #[error("verification token expired")]
    Expired,
}

/// Outcome of every session lifecycle operation that did not succeed.
///
/// None of these are retried internally. A lost rotation race and a detected
/// theft are terminal for the presented token and are surfaced verbatim.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Bad signature, wrong token type, or expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// A refresh token that was already rotated has been presented again.
    #[error("Token reuse detected, all sessions have been revoked")]
    TokenTheftDetected,

    /// The refresh token was consumed by a concurrent request or is no longer active.
    #[error("Session not found or already used")]
    SessionNotFoundOrAlreadyUsed,

    /// The session was flagged suspicious and has not been verified.
    #[error("Session requires verification")]
    RequiresVerification,

    /// The token's embedded version no longer matches the user's.
    #[error("Session invalidated")]
    Invalidated,

    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationFailure),

    #[error("User {0} not found")]
    UserNotFound(DbId),

    #[error("Session {0} not found")]
    SessionNotFound(DbId),

    #[error("Cannot revoke the current session, log out instead")]
    CannotRevokeCurrentSession,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for engine return values.
pub type SessionResult<T> = Result<T, SessionError>;
