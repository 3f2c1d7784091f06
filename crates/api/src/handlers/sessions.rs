//! Handlers for the `/sessions` resource.
//!
//! All routes act on the authenticated user's own sessions. The caller's
//! current session is identified by the `X-Refresh-Token` header.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tessera_core::session::{SessionStats, SessionView};
use tessera_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for `GET /sessions`.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionView>,
    pub stats: SessionStats,
}

/// Response for the revoke endpoints.
#[derive(Debug, Serialize)]
pub struct RevokedResponse {
    pub revoked: u64,
}

/// GET /api/v1/sessions
///
/// Active sessions, most recently used first.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<SessionListResponse>>> {
    let sessions = state
        .sessions
        .list_sessions(auth_user.user_id, auth_user.current_refresh_token.as_deref())
        .await?;
    let stats = state.sessions.session_stats(auth_user.user_id).await?;

    Ok(Json(DataResponse {
        data: SessionListResponse { sessions, stats },
    }))
}

/// DELETE /api/v1/sessions/{id}
///
/// Revoke one session on another device.
pub async fn revoke_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<RevokedResponse>>> {
    state
        .sessions
        .revoke_session(
            auth_user.user_id,
            session_id,
            auth_user.current_refresh_token.as_deref(),
        )
        .await?;

    Ok(Json(DataResponse {
        data: RevokedResponse { revoked: 1 },
    }))
}

/// POST /api/v1/sessions/revoke-all
///
/// Revoke every session of the user, including the current one.
pub async fn revoke_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<RevokedResponse>>> {
    let revoked = state.sessions.revoke_all_sessions(auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: RevokedResponse { revoked },
    }))
}

/// POST /api/v1/sessions/revoke-others
///
/// Revoke every session except the current one. Requires `X-Refresh-Token`.
pub async fn revoke_others(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<RevokedResponse>>> {
    let current = auth_user.current_refresh_token.as_deref().ok_or_else(|| {
        AppError::BadRequest("X-Refresh-Token header is required to keep the current session".into())
    })?;
    let revoked = state
        .sessions
        .revoke_other_sessions(auth_user.user_id, current)
        .await?;

    Ok(Json(DataResponse {
        data: RevokedResponse { revoked },
    }))
}
