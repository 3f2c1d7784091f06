//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Authenticates the Bearer access token against the
//!   user's current token version.
//!   The caller's current refresh token is read from `X-Refresh-Token`.

pub mod auth;
