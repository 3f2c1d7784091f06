//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login           -> login
/// POST /refresh         -> refresh
/// POST /logout          -> logout
/// POST /verify-session  -> verify_session (requires auth)
/// GET  /me              -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/verify-session", post(auth::verify_session))
        .route("/me", get(auth::me))
}
