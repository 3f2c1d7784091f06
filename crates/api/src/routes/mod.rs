pub mod auth;
pub mod health;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                  login
/// /auth/refresh                rotate refresh token
/// /auth/logout                 revoke current session
/// /auth/verify-session         confirm suspicious session
/// /auth/me                     current user + session stats
///
/// /sessions                    list active sessions
/// /sessions/{id}               revoke one session
/// /sessions/revoke-all         revoke all sessions
/// /sessions/revoke-others      revoke all but the current session
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/sessions", sessions::router())
}
