//! User entity model and DTOs.

use sqlx::FromRow;
use tessera_core::store::UserSecurity;
use tessera_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- never serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub token_version: i32,
    pub known_countries: Vec<String>,
    pub known_ips: Vec<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserSecurity {
    fn from(user: User) -> Self {
        UserSecurity {
            user_id: user.id,
            token_version: user.token_version,
            known_countries: user.known_countries,
            known_ips: user.known_ips,
            last_login_at: user.last_login_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
}
