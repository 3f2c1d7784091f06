//! SHA-256 digests and random hex identifiers.
//!
//! Refresh tokens are only ever persisted as their SHA-256 hex digest, so a
//! leaked `user_sessions` table does not hand out usable credentials.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of random bytes in a token family identifier.
pub const TOKEN_FAMILY_BYTES: usize = 16;

/// Number of random bytes in a session verification token.
pub const VERIFICATION_TOKEN_BYTES: usize = 32;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Digest under which a refresh token is stored and looked up.
pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

/// Generate `len` random bytes and return them as lowercase hex.
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(bytes.as_mut_slice());
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// New opaque identifier shared by every rotation of one login.
pub fn generate_token_family() -> String {
    random_hex(TOKEN_FAMILY_BYTES)
}

/// New human-deliverable token used to confirm a suspicious session.
pub fn generate_verification_token() -> String {
    random_hex(VERIFICATION_TOKEN_BYTES)
}
