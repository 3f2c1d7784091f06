//! Signed access and refresh tokens.
//!
//! Both kinds are HS256 JWTs, each signed with its own secret. The payload
//! field names (`userId`, `tokenVersion`, `tokenFamily`, `type`) are fixed so
//! any other verifier can read them. A `jti` is added so that two refresh
//! tokens minted in the same second for the same family never collide.
//!
//! Everything outside this module treats tokens as opaque bearer strings.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::types::{DbId, Timestamp};

/// Discriminates the two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: DbId,
    pub token_version: i32,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Claims embedded in every refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: DbId,
    pub token_family: String,
    pub token_version: i32,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub access_expires_in: i64,
    /// Expiry of the refresh token; the owning session expires at the same instant.
    pub refresh_expires_at: Timestamp,
}

/// Creates and verifies signed tokens.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    /// Sign an access token for `user_id` at `token_version`.
    pub fn issue_access(&self, user_id: DbId, token_version: i32) -> SessionResult<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            user_id,
            token_version,
            token_type: TokenType::Access,
            iat: now,
            exp: now + self.access_ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| SessionError::Internal(format!("Token generation error: {e}")))
    }

    /// Sign a refresh token belonging to `token_family`.
    ///
    /// Returns the token together with its expiry instant.
    pub fn issue_refresh(
        &self,
        user_id: DbId,
        token_family: &str,
        token_version: i32,
    ) -> SessionResult<(String, Timestamp)> {
        let now = Utc::now();
        let expires_at = now + self.refresh_ttl;
        let claims = RefreshClaims {
            user_id,
            token_family: token_family.to_string(),
            token_version,
            token_type: TokenType::Refresh,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| SessionError::Internal(format!("Token generation error: {e}")))?;
        Ok((token, expires_at))
    }

    /// Issue both tokens of a pair sharing `token_family`.
    pub fn issue_pair(
        &self,
        user_id: DbId,
        token_family: &str,
        token_version: i32,
    ) -> SessionResult<TokenPair> {
        let access_token = self.issue_access(user_id, token_version)?;
        let (refresh_token, refresh_expires_at) =
            self.issue_refresh(user_id, token_family, token_version)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.access_ttl.num_seconds(),
            refresh_expires_at,
        })
    }

    /// Verify signature, expiry and `type == "access"`.
    pub fn verify_access(&self, token: &str) -> SessionResult<AccessClaims> {
        let claims: AccessClaims = decode(token, &self.access_decoding, &validation())
            .map_err(|_| SessionError::InvalidToken)?
            .claims;
        if claims.token_type != TokenType::Access {
            return Err(SessionError::InvalidToken);
        }
        Ok(claims)
    }

    /// Verify signature, expiry and `type == "refresh"`.
    pub fn verify_refresh(&self, token: &str) -> SessionResult<RefreshClaims> {
        let claims: RefreshClaims = decode(token, &self.refresh_decoding, &validation())
            .map_err(|_| SessionError::InvalidToken)?
            .claims;
        if claims.token_type != TokenType::Refresh {
            return Err(SessionError::InvalidToken);
        }
        Ok(claims)
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}
