//! Out-of-band delivery of session verification tokens.
//!
//! A suspicious login is only usable for rotation after the user confirms it
//! with a token sent through a channel other than the login response.

use tessera_core::types::{DbId, Timestamp};

/// Everything a channel needs to ask the user to confirm a login.
#[derive(Debug, Clone)]
pub struct VerificationDelivery {
    pub user_id: DbId,
    pub email: String,
    pub session_id: DbId,
    pub token: String,
    pub expires_at: Option<Timestamp>,
    /// Why the login was flagged, e.g. `new country: BR`.
    pub reason: Option<String>,
}

/// Sends verification tokens to users.
pub trait VerificationNotifier: Send + Sync {
    fn deliver(&self, delivery: VerificationDelivery);
}

/// Records that a delivery was requested without sending anything.
///
/// The token itself is never written to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl VerificationNotifier for LogNotifier {
    fn deliver(&self, delivery: VerificationDelivery) {
        tracing::warn!(
            user_id = delivery.user_id,
            session_id = delivery.session_id,
            reason = delivery.reason.as_deref().unwrap_or_default(),
            "Session verification required but no delivery channel is configured"
        );
    }
}
