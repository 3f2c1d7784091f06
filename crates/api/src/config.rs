use tessera_core::config::{
    SessionConfig, DEFAULT_ACCESS_TOKEN_TTL, DEFAULT_MAX_SESSIONS_PER_USER,
    DEFAULT_REFRESH_TOKEN_TTL, DEFAULT_VERIFICATION_TOKEN_TTL,
};

/// Default janitor interval in seconds.
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 3600;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How often expired sessions are purged (default: `3600`).
    pub session_purge_interval_secs: u64,
    /// Token secrets, lifetimes and the per-user session cap.
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SESSION_PURGE_INTERVAL_SECS` | `3600`                     |
    ///
    /// Session settings are read by [`session_config_from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_purge_interval_secs = parse_purge_interval(
            &std::env::var("SESSION_PURGE_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_PURGE_INTERVAL_SECS.to_string()),
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session_purge_interval_secs,
            session: session_config_from_env(),
        }
    }
}

/// Load the session engine settings from environment variables.
///
/// | Env Var                  | Required | Default |
/// |--------------------------|----------|---------|
/// | `JWT_ACCESS_SECRET`      | **yes**  | --      |
/// | `JWT_REFRESH_SECRET`     | **yes**  | --      |
/// | `JWT_ACCESS_EXPIRES_IN`  | no       | `15m`   |
/// | `JWT_REFRESH_EXPIRES_IN` | no       | `7d`    |
/// | `VERIFICATION_TOKEN_TTL` | no       | `24h`   |
/// | `MAX_SESSIONS_PER_USER`  | no       | `3`     |
///
/// Lifetimes that do not parse fall back to their default with a warning.
///
/// # Panics
///
/// Panics if either secret is missing or empty, or if both are equal.
pub fn session_config_from_env() -> SessionConfig {
    let access_secret = required_secret("JWT_ACCESS_SECRET");
    let refresh_secret = required_secret("JWT_REFRESH_SECRET");
    assert_ne!(
        access_secret, refresh_secret,
        "JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ"
    );

    let access_ttl = std::env::var("JWT_ACCESS_EXPIRES_IN")
        .unwrap_or_else(|_| DEFAULT_ACCESS_TOKEN_TTL.into());
    let refresh_ttl = std::env::var("JWT_REFRESH_EXPIRES_IN")
        .unwrap_or_else(|_| DEFAULT_REFRESH_TOKEN_TTL.into());
    let verification_ttl = std::env::var("VERIFICATION_TOKEN_TTL")
        .unwrap_or_else(|_| DEFAULT_VERIFICATION_TOKEN_TTL.into());

    let max_sessions: usize = std::env::var("MAX_SESSIONS_PER_USER")
        .unwrap_or_else(|_| DEFAULT_MAX_SESSIONS_PER_USER.to_string())
        .parse()
        .expect("MAX_SESSIONS_PER_USER must be a valid usize");

    SessionConfig::new(access_secret, refresh_secret)
        .with_access_ttl(&access_ttl)
        .with_refresh_ttl(&refresh_ttl)
        .with_verification_ttl(&verification_ttl)
        .with_max_sessions(max_sessions)
}

fn required_secret(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
    assert!(!value.is_empty(), "{name} must not be empty");
    value
}

/// The janitor's tick period; `tokio::time::interval` rejects zero.
fn parse_purge_interval(raw: &str) -> u64 {
    let secs: u64 = raw
        .parse()
        .expect("SESSION_PURGE_INTERVAL_SECS must be a valid u64");
    assert!(secs > 0, "SESSION_PURGE_INTERVAL_SECS must be greater than zero");
    secs
}
