//! User session model.

use sqlx::FromRow;
use tessera_core::device::LocationSource;
use tessera_core::session::Session;
use tessera_core::types::{DbId, Timestamp};

/// A session row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
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
    /// `ip` or `gps`, enforced by a CHECK constraint.
    pub location_source: String,
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

impl From<UserSession> for Session {
    fn from(row: UserSession) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            refresh_token_hash: row.refresh_token_hash,
            token_family: row.token_family,
            device_name: row.device_name,
            browser: row.browser,
            os: row.os,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            country: row.country,
            city: row.city,
            latitude: row.latitude,
            longitude: row.longitude,
            location_source: LocationSource::from_db(&row.location_source),
            is_suspicious: row.is_suspicious,
            suspicious_reason: row.suspicious_reason,
            is_verified: row.is_verified,
            verification_token: row.verification_token,
            verification_token_expires: row.verification_token_expires,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
            expires_at: row.expires_at,
            is_revoked: row.is_revoked,
            revoked_at: row.revoked_at,
            revoked_reason: row.revoked_reason,
        }
    }
}
