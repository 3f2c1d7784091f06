//! Repository for the `users` table.

use sqlx::PgPool;
use tessera_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, token_version, known_countries, known_ips, \
                        last_login_at, created_at, updated_at";

/// Provides the user operations the session engine relies on.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Bump `token_version`, returning the new value.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn increment_token_version(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE users SET token_version = token_version + 1
             WHERE id = $1
             RETURNING token_version",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Add a country and/or IP to the known sets (skipping duplicates) and
    /// set `last_login_at` to now.
    pub async fn record_trusted_login(
        pool: &PgPool,
        id: DbId,
        country: Option<&str>,
        ip: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                known_countries = CASE
                    WHEN $2::TEXT IS NULL OR $2::TEXT = ANY(known_countries) THEN known_countries
                    ELSE array_append(known_countries, $2::TEXT)
                END,
                known_ips = CASE
                    WHEN $3::TEXT IS NULL OR $3::TEXT = ANY(known_ips) THEN known_ips
                    ELSE array_append(known_ips, $3::TEXT)
                END,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(country)
        .bind(ip)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Reset the known-location baseline.
    pub async fn clear_known_locations(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET known_countries = '{}', known_ips = '{}' WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
