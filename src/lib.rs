//! # Vestibule
//!
//! Account registration and authentication over HTTP.
//!
//! Accounts are keyed by a normalized email and protected by a bcrypt
//! digest. A successful login returns an HS256 bearer token whose `sub`
//! claim is the account id; `GET /accounts/me` resolves it back to the
//! account.
//!
//! Tokens carry no expiry and are never persisted, so they cannot be
//! revoked short of rotating the signing secret.

pub mod auth;
pub mod cli;
pub mod store;
pub mod vestibule;
