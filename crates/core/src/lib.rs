//! Session and token lifecycle engine.
//!
//! - [`token`] -- signed access/refresh tokens ([`token::TokenCodec`]).
//! - [`store`] -- storage contracts ([`store::SessionStore`], [`store::UserRepository`]).
//! - [`detector`] -- location-based suspicious login heuristics.
//! - [`limiter`] -- per-user active session cap.
//! - [`manager`] -- the [`manager::SessionManager`] engine: login, rotation,
//!   verification and session management.
//! - [`memory`] -- in-process store used by tests and single-process setups.
//!
//! No database or HTTP dependencies live here.

pub mod config;
pub mod detector;
pub mod device;
pub mod error;
pub mod hashing;
pub mod limiter;
pub mod management;
pub mod manager;
pub mod memory;
pub mod rotation;
pub mod session;
pub mod store;
pub mod token;
pub mod types;
pub mod verification;
