//! Access-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tessera_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the caller's current refresh token.
///
/// Only used to tell which listed session is the caller's own and to record
/// activity on it; it never authenticates a request by itself.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Authenticated user extracted from a Bearer access token.
///
/// Rejects tokens whose embedded version no longer matches the user's, so a
/// force logout takes effect on the next request.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub token_version: i32,
    /// Value of the `X-Refresh-Token` header, if the client sent one.
    pub current_refresh_token: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        let principal = state.sessions.authenticate(token).await?;

        let current_refresh_token = refresh_token_header(parts);
        if let Some(refresh_token) = current_refresh_token.clone() {
            // Activity tracking must not delay or fail the request.
            let sessions = state.sessions.clone();
            tokio::spawn(async move {
                if let Err(e) = sessions.touch_session(&refresh_token).await {
                    tracing::debug!(error = %e, "Failed to record session activity");
                }
            });
        }

        Ok(AuthUser {
            user_id: principal.user_id,
            token_version: principal.token_version,
            current_refresh_token,
        })
    }
}

/// Read the caller's refresh token from [`REFRESH_TOKEN_HEADER`].
pub fn refresh_token_header(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
