use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tessera_core::error::{SessionError, VerificationFailure};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`SessionError`] for engine outcomes and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An outcome of the session lifecycle engine.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or unusable credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Session(err) => classify_session_error(err),

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an engine outcome to an HTTP status, error code, and message.
fn classify_session_error(err: &SessionError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        SessionError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message),
        SessionError::TokenTheftDetected => {
            (StatusCode::UNAUTHORIZED, "TOKEN_THEFT_DETECTED", message)
        }
        SessionError::SessionNotFoundOrAlreadyUsed => {
            (StatusCode::UNAUTHORIZED, "SESSION_NOT_FOUND", message)
        }
        SessionError::Invalidated => (StatusCode::UNAUTHORIZED, "SESSION_INVALIDATED", message),
        SessionError::UserNotFound(_) => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "User no longer exists".to_string(),
        ),
        SessionError::RequiresVerification => (
            StatusCode::FORBIDDEN,
            "SESSION_REQUIRES_VERIFICATION",
            message,
        ),
        SessionError::Verification(failure) => {
            let code = match failure {
                VerificationFailure::NotFound => "VERIFICATION_SESSION_NOT_FOUND",
                VerificationFailure::NotSuspicious => "VERIFICATION_NOT_REQUIRED",
                VerificationFailure::InvalidToken => "VERIFICATION_TOKEN_INVALID",
                VerificationFailure::Expired => "VERIFICATION_TOKEN_EXPIRED",
            };
            (StatusCode::BAD_REQUEST, code, failure.to_string())
        }
        SessionError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
        SessionError::CannotRevokeCurrentSession => {
            (StatusCode::BAD_REQUEST, "CANNOT_REVOKE_CURRENT_SESSION", message)
        }
        SessionError::Store(store) => {
            tracing::error!(error = %store, "Session store error");
            internal()
        }
        SessionError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal session error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
