//! Handlers for the `/auth` resource (login, refresh, logout, verification).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tessera_core::device::LocationCapture;
use tessera_core::session::{SessionStats, SessionView};
use tessera_core::token::TokenPair;
use tessera_core::types::{DbId, Timestamp};
use tessera_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::password::verify_password;
use crate::device::ClientMeta;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notify::VerificationDelivery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Message attached to a login that must be verified before refresh works.
const VERIFICATION_MESSAGE: &str =
    "Login from a new location detected. Check your email to verify this session.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
///
/// `latitude` and `longitude` are only used when both are present.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Request body for `POST /auth/logout`.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Request body for `POST /auth/verify-session`.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifySessionRequest {
    pub session_id: DbId,
    #[validate(length(min = 1))]
    pub verification_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub refresh_expires_at: Timestamp,
    pub session: SessionView,
    /// Refresh is blocked until the session is verified.
    pub requires_verification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for `POST /auth/verify-session`.
#[derive(Debug, Serialize)]
pub struct VerifySessionResponse {
    pub session_id: DbId,
    pub is_verified: bool,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: DbId,
    pub email: String,
    pub token_version: i32,
    pub last_login_at: Option<Timestamp>,
    pub sessions: SessionStats,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens; a
/// login from an unfamiliar location additionally requires verification.
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(meta): ClientMeta,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // 1. Find user by email.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    // 2. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    // 3. Resolve the device and open the session.
    let device = state.device_resolver.resolve(
        &meta,
        LocationCapture::from_coordinates(input.latitude, input.longitude),
    );
    let outcome = state.sessions.login(user.id, device).await?;

    // 4. Hand the verification token to the out-of-band channel.
    if let Some(token) = outcome.verification_token {
        state.notifier.deliver(VerificationDelivery {
            user_id: user.id,
            email: user.email.clone(),
            session_id: outcome.session.id,
            token,
            expires_at: outcome.session.verification_token_expires,
            reason: outcome.session.suspicious_reason.clone(),
        });
    }

    let message = outcome
        .requires_verification
        .then(|| VERIFICATION_MESSAGE.to_string());

    Ok(Json(auth_response(
        outcome.tokens,
        SessionView::from_session(&outcome.session, true),
        outcome.requires_verification,
        message,
    )))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new pair. The presented token is consumed;
/// presenting it again is treated as theft.
pub async fn refresh(
    State(state): State<AppState>,
    ClientMeta(meta): ClientMeta,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let device = state.device_resolver.resolve(
        &meta,
        LocationCapture::from_coordinates(input.latitude, input.longitude),
    );
    let outcome = state.sessions.rotate(&input.refresh_token, device).await?;

    Ok(Json(auth_response(
        outcome.tokens,
        SessionView::from_session(&outcome.session, true),
        false,
        None,
    )))
}

/// POST /api/v1/auth/logout
///
/// Revoke the session behind the given refresh token. Always 204, including
/// for unknown or missing tokens.
pub async fn logout(
    State(state): State<AppState>,
    Json(input): Json<LogoutRequest>,
) -> AppResult<StatusCode> {
    state.sessions.logout(input.refresh_token.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/verify-session
///
/// Confirm a suspicious session of the authenticated user.
pub async fn verify_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<VerifySessionRequest>,
) -> AppResult<Json<DataResponse<VerifySessionResponse>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let session = state
        .sessions
        .verify_session(input.session_id, &input.verification_token, auth_user.user_id)
        .await?;

    Ok(Json(DataResponse {
        data: VerifySessionResponse {
            session_id: session.id,
            is_verified: session.is_verified,
        },
    }))
}

/// GET /api/v1/auth/me
///
/// The authenticated user with a summary of their sessions.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;
    let sessions = state.sessions.session_stats(user.id).await?;

    Ok(Json(DataResponse {
        data: MeResponse {
            id: user.id,
            email: user.email,
            token_version: user.token_version,
            last_login_at: user.last_login_at,
            sessions,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".into())
}

fn auth_response(
    tokens: TokenPair,
    session: SessionView,
    requires_verification: bool,
    message: Option<String>,
) -> AuthResponse {
    AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.access_expires_in,
        refresh_expires_at: tokens.refresh_expires_at,
        session,
        requires_verification,
        message,
    }
}
