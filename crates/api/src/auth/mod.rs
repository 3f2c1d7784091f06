//! Credential primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//!
//! Token issuing and validation live in `tessera_core::token`.

pub mod password;
