//! Route definitions for the `/sessions` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`. All require auth.
///
/// ```text
/// GET    /               -> list_sessions
/// DELETE /{id}           -> revoke_session
/// POST   /revoke-all     -> revoke_all
/// POST   /revoke-others  -> revoke_others
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::list_sessions))
        .route("/{id}", delete(sessions::revoke_session))
        .route("/revoke-all", post(sessions::revoke_all))
        .route("/revoke-others", post(sessions::revoke_others))
}
