//! In-memory repository for handler and service tests.

use super::{Account, AccountRepository, StoreError};
use crate::auth::password::PasswordDigest;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    fail: bool,
}

impl MemoryAccountStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like an unreachable database.
    pub(crate) fn failing() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn accounts(&self) -> Vec<Account> {
        self.accounts
            .lock()
            .map(|accounts| accounts.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::InvalidRow("memory store lock poisoned".to_string())
}

#[async_trait]
impl AccountRepository for MemoryAccountStore {
    async fn create(
        &self,
        email: &str,
        password_hash: &PasswordDigest,
    ) -> Result<Account, StoreError> {
        self.check()?;
        let mut accounts = self.accounts.lock().map_err(|_| poisoned())?;
        if accounts.iter().any(|account| account.email == email) {
            return Err(StoreError::AlreadyExists);
        }

        let now = Utc::now();
        let account = Account {
            id: accounts.len() as u64 + 1,
            email: email.to_string(),
            password_hash: password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError> {
        self.check()?;
        let accounts = self.accounts.lock().map_err(|_| poisoned())?;
        accounts
            .iter()
            .find(|account| account.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: u64) -> Result<Account, StoreError> {
        self.check()?;
        let accounts = self.accounts.lock().map_err(|_| poisoned())?;
        accounts
            .iter()
            .find(|account| account.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
