//! Session engine configuration and the `<integer><unit>` TTL grammar.

use chrono::Duration;

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TOKEN_TTL: &str = "15m";
/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TOKEN_TTL: &str = "7d";
/// Default window for confirming a suspicious session.
pub const DEFAULT_VERIFICATION_TOKEN_TTL: &str = "24h";
/// Default number of concurrently active sessions per user.
pub const DEFAULT_MAX_SESSIONS_PER_USER: usize = 3;
/// Longest accepted TTL (100 years). Anything longer is treated as malformed
/// so `now + ttl` stays representable.
pub const MAX_TTL_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// Parse a TTL such as `30s`, `15m`, `12h` or `7d`.
///
/// Returns `None` when the string does not match `^(\d+)([smhd])$` or the
/// lifetime exceeds [`MAX_TTL_SECONDS`].
pub fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let unit = raw.chars().last()?;
    let digits = &raw[..raw.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    let seconds = match unit {
        's' => Some(value),
        'm' => value.checked_mul(60),
        'h' => value.checked_mul(60 * 60),
        'd' => value.checked_mul(24 * 60 * 60),
        _ => None,
    }?;
    if seconds > MAX_TTL_SECONDS {
        return None;
    }
    Duration::try_seconds(seconds)
}

/// Parse `raw`, falling back to `default` (which must itself be valid).
pub fn ttl_or_default(raw: &str, default: &str) -> Duration {
    parse_ttl(raw).unwrap_or_else(|| {
        tracing::warn!(ttl = raw, fallback = default, "Unrecognized TTL, using default");
        parse_ttl(default).unwrap_or_else(|| Duration::days(7))
    })
}

/// Settings consumed by [`SessionManager`](crate::manager::SessionManager).
///
/// Holds plain values only; loading from the environment is the caller's job.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret for access tokens.
    pub access_secret: String,
    /// HMAC secret for refresh tokens. Kept distinct from the access secret.
    pub refresh_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub verification_token_ttl: Duration,
    pub max_sessions_per_user: usize,
}

impl SessionConfig {
    /// Build a config with the default lifetimes and session cap.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_token_ttl: ttl_or_default(DEFAULT_ACCESS_TOKEN_TTL, DEFAULT_ACCESS_TOKEN_TTL),
            refresh_token_ttl: ttl_or_default(DEFAULT_REFRESH_TOKEN_TTL, DEFAULT_REFRESH_TOKEN_TTL),
            verification_token_ttl: ttl_or_default(
                DEFAULT_VERIFICATION_TOKEN_TTL,
                DEFAULT_VERIFICATION_TOKEN_TTL,
            ),
            max_sessions_per_user: DEFAULT_MAX_SESSIONS_PER_USER,
        }
    }

    /// Override the access token lifetime from a TTL string.
    pub fn with_access_ttl(mut self, raw: &str) -> Self {
        self.access_token_ttl = ttl_or_default(raw, DEFAULT_ACCESS_TOKEN_TTL);
        self
    }

    /// Override the refresh token lifetime from a TTL string.
    pub fn with_refresh_ttl(mut self, raw: &str) -> Self {
        self.refresh_token_ttl = ttl_or_default(raw, DEFAULT_REFRESH_TOKEN_TTL);
        self
    }

    /// Override the verification window from a TTL string.
    pub fn with_verification_ttl(mut self, raw: &str) -> Self {
        self.verification_token_ttl = ttl_or_default(raw, DEFAULT_VERIFICATION_TOKEN_TTL);
        self
    }

    /// Override the per-user session cap. A cap of zero is raised to one.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions_per_user = max.max(1);
        self
    }
}
