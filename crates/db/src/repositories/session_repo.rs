//! Repository for the `user_sessions` table.

use sqlx::PgPool;
use tessera_core::session::NewSession;
use tessera_core::types::{DbId, Timestamp};

use crate::models::session::UserSession;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token_hash, token_family, device_name, browser, os, \
                        ip_address, user_agent, country, city, latitude, longitude, location_source, \
                        is_suspicious, suspicious_reason, is_verified, verification_token, \
                        verification_token_expires, created_at, last_used_at, expires_at, \
                        is_revoked, revoked_at, revoked_reason";

/// Predicate selecting rows that are still usable.
const ACTIVE: &str = "is_revoked = false AND expires_at > NOW()";

/// Provides session persistence, including the atomic rotation primitive.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (
                user_id, refresh_token_hash, token_family, device_name, browser, os,
                ip_address, user_agent, country, city, latitude, longitude, location_source,
                is_suspicious, suspicious_reason, is_verified, verification_token,
                verification_token_expires, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING {COLUMNS}"
        );
        let device = &input.device;
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.token_family)
            .bind(&device.device_name)
            .bind(&device.browser)
            .bind(&device.os)
            .bind(&device.ip_address)
            .bind(&device.user_agent)
            .bind(&device.country)
            .bind(&device.city)
            .bind(device.latitude)
            .bind(device.longitude)
            .bind(device.location_source.as_str())
            .bind(input.is_suspicious)
            .bind(&input.suspicious_reason)
            .bind(input.is_verified())
            .bind(&input.verification_token)
            .bind(input.verification_token_expires)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Revoke the active session with this hash and return it as it was
    /// before the update, in a single statement.
    ///
    /// The inner `FOR UPDATE` serializes concurrent callers on the row; a
    /// caller that waited re-evaluates the predicate against the committed
    /// revoke and matches nothing.
    pub async fn find_and_revoke_atomic(
        pool: &PgPool,
        hash: &str,
        reason: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        sqlx::query_as::<_, UserSession>(
            "UPDATE user_sessions s
             SET is_revoked = true, revoked_at = NOW(), revoked_reason = $2
             FROM (
                 SELECT id, is_revoked, revoked_at, revoked_reason
                 FROM user_sessions
                 WHERE refresh_token_hash = $1
                   AND is_revoked = false
                   AND expires_at > NOW()
                 FOR UPDATE
             ) prev
             WHERE s.id = prev.id AND s.is_revoked = false
             RETURNING s.id, s.user_id, s.refresh_token_hash, s.token_family, s.device_name,
                       s.browser, s.os, s.ip_address, s.user_agent, s.country, s.city,
                       s.latitude, s.longitude, s.location_source, s.is_suspicious,
                       s.suspicious_reason, s.is_verified, s.verification_token,
                       s.verification_token_expires, s.created_at, s.last_used_at,
                       s.expires_at, prev.is_revoked, prev.revoked_at, prev.revoked_reason",
        )
        .bind(hash)
        .bind(reason)
        .fetch_optional(pool)
        .await
    }

    /// Find an already revoked session by hash.
    pub async fn find_revoked(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE refresh_token_hash = $1 AND is_revoked = true"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Find an active session by hash.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE refresh_token_hash = $1 AND {ACTIVE}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Find a session by id, scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, UserSession>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Active sessions of a user, oldest first.
    pub async fn list_active(pool: &PgPool, user_id: DbId) -> Result<Vec<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE user_id = $1 AND {ACTIVE}
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_active(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND {ACTIVE}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Revoke a single session. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: DbId, reason: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true, revoked_at = NOW(), revoked_reason = $2
             WHERE id = $1 AND is_revoked = false",
        )
        .bind(id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke the listed sessions. Returns the count of revoked sessions.
    pub async fn revoke_many(
        pool: &PgPool,
        ids: &[DbId],
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true, revoked_at = NOW(), revoked_reason = $2
             WHERE id = ANY($1) AND is_revoked = false",
        )
        .bind(ids)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Revoke every session of a token family.
    pub async fn revoke_family(
        pool: &PgPool,
        token_family: &str,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true, revoked_at = NOW(), revoked_reason = $2
             WHERE token_family = $1 AND is_revoked = false",
        )
        .bind(token_family)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Revoke all active sessions for a user. Returns the count of revoked sessions.
    pub async fn revoke_all_for_user(
        pool: &PgPool,
        user_id: DbId,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true, revoked_at = NOW(), revoked_reason = $2
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Revoke all of a user's sessions except the one with `keep_hash`.
    pub async fn revoke_others(
        pool: &PgPool,
        user_id: DbId,
        keep_hash: &str,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true, revoked_at = NOW(), revoked_reason = $3
             WHERE user_id = $1 AND is_revoked = false AND refresh_token_hash <> $2",
        )
        .bind(user_id)
        .bind(keep_hash)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark a session verified and clear its verification token.
    ///
    /// Matches only an active suspicious session still holding `token`
    /// before its expiry, so a concurrent revoke wins.
    pub async fn mark_verified(pool: &PgPool, id: DbId, token: &str) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET
                is_verified = true,
                verification_token = NULL,
                verification_token_expires = NULL
             WHERE id = $1 AND {ACTIVE}
               AND is_suspicious = true
               AND verification_token = $2
               AND verification_token_expires > NOW()"
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_used_at = NOW()` on an active session not touched since `stale_before`.
    pub async fn touch_last_used(
        pool: &PgPool,
        hash: &str,
        stale_before: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET last_used_at = NOW()
             WHERE refresh_token_hash = $1 AND {ACTIVE} AND last_used_at < $2"
        );
        let result = sqlx::query(&query)
            .bind(hash)
            .bind(stale_before)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions that expired before `cutoff`. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
