//! Credential handling and the account flows built on it.

pub mod email;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use self::error::AuthError;
pub use self::password::{CredentialHasher, PasswordDigest};
pub use self::service::AccountService;
pub use self::token::TokenIssuer;
