pub mod health;
pub use self::health::health;

pub mod account_register;
pub use self::account_register::register;

pub mod account_login;
pub use self::account_login::login;

pub mod account_me;
pub use self::account_me::me;

mod error;

// common types for the handlers
use serde::Deserialize;
use std::fmt;
use utoipa::ToSchema;

/// Request body shared by registration and login.
#[derive(ToSchema, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

pub(crate) const INVALID_BODY: &str = "Invalid request body";
