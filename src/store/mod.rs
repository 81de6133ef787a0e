//! Account persistence.
//!
//! The service only talks to [`AccountRepository`]; uniqueness of the
//! normalized email is enforced by the backing store, not in process.

use crate::auth::password::PasswordDigest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub mod postgres;
pub use self::postgres::PgAccountStore;

#[cfg(test)]
pub(crate) mod memory;

/// A registered account.
///
/// The password digest is skipped by serialization, so any JSON built from
/// an `Account` is safe to hand to a client.
#[derive(ToSchema, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: u64,
    pub email: String,
    #[serde(skip)]
    pub password_hash: PasswordDigest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account already exists")]
    AlreadyExists,
    #[error("account not found")]
    NotFound,
    #[error("invalid account row: {0}")]
    InvalidRow(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account. Fails with [`StoreError::AlreadyExists`] when the
    /// email is taken; the check and insert are a single atomic statement.
    async fn create(
        &self,
        email: &str,
        password_hash: &PasswordDigest,
    ) -> Result<Account, StoreError>;

    /// Look up an account by its normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError>;

    async fn find_by_id(&self, id: u64) -> Result<Account, StoreError>;

    /// Cheap liveness probe of the backing store.
    async fn ping(&self) -> Result<(), StoreError>;
}
