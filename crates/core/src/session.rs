//! Session records: one per issued refresh-token generation.

use serde::Serialize;

use crate::device::{DeviceContext, LocationSource};
use crate::types::{DbId, Timestamp};

/// Revocation reasons written by the engine.
pub mod reasons {
    pub const TOKEN_ROTATED: &str = "Token rotated";
    pub const SESSION_LIMIT_EXCEEDED: &str = "session limit exceeded";
    pub const THEFT_FAMILY: &str = "Token theft detected - token reused";
    pub const THEFT_ALL_SESSIONS: &str = "Token theft detected - all sessions invalidated";
    pub const USER_LOGOUT: &str = "User logout";
    pub const LOGOUT_FROM_DEVICE: &str = "User logout from device";
    pub const LOGOUT_ALL_DEVICES: &str = "User logout all devices";
    pub const LOGOUT_OTHER_DEVICES: &str = "User logout other devices";
}

/// A persisted session row.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub token_family: String,
    pub device_name: String,
    pub browser: String,
    pub os: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub country: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_source: LocationSource,
    pub is_suspicious: bool,
    pub suspicious_reason: Option<String>,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub verification_token_expires: Option<Timestamp>,
    pub created_at: Timestamp,
    pub last_used_at: Timestamp,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub revoked_at: Option<Timestamp>,
    pub revoked_reason: Option<String>,
}

impl Session {
    /// Not revoked and not yet expired.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_revoked && self.expires_at > now
    }

    /// Flagged at login and still waiting for the human to confirm it.
    pub fn awaits_verification(&self) -> bool {
        self.is_suspicious && !self.is_verified
    }

    /// Whether rotation may consume this session.
    pub fn is_consumable(&self, now: Timestamp) -> bool {
        self.is_active(now) && !self.awaits_verification()
    }
}

/// Input for [`SessionStore::create_session`](crate::store::SessionStore::create_session).
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub token_family: String,
    pub device: DeviceContext,
    pub is_suspicious: bool,
    pub suspicious_reason: Option<String>,
    pub verification_token: Option<String>,
    pub verification_token_expires: Option<Timestamp>,
    pub expires_at: Timestamp,
}

impl NewSession {
    /// `is_verified` defaults to true and is false only for suspicious sessions.
    pub fn is_verified(&self) -> bool {
        !self.is_suspicious
    }
}

/// Client-facing view of a session. Never carries the hash, family or
/// verification token.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: DbId,
    pub device_name: String,
    pub browser: String,
    pub os: String,
    pub ip_address: String,
    pub country: String,
    pub city: String,
    pub location_source: LocationSource,
    pub is_suspicious: bool,
    pub suspicious_reason: Option<String>,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub last_used_at: Timestamp,
    pub expires_at: Timestamp,
    pub is_current: bool,
}

impl SessionView {
    pub fn from_session(session: &Session, is_current: bool) -> Self {
        Self {
            id: session.id,
            device_name: session.device_name.clone(),
            browser: session.browser.clone(),
            os: session.os.clone(),
            ip_address: session.ip_address.clone(),
            country: session.country.clone(),
            city: session.city.clone(),
            location_source: session.location_source,
            is_suspicious: session.is_suspicious,
            suspicious_reason: session.suspicious_reason.clone(),
            is_verified: session.is_verified,
            created_at: session.created_at,
            last_used_at: session.last_used_at,
            expires_at: session.expires_at,
            is_current,
        }
    }
}

/// Per-user session counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub active_sessions: usize,
    pub suspicious_sessions: usize,
    pub max_sessions: usize,
}
