//! Registration and login flows.

use super::{
    email,
    error::AuthError,
    password::{CredentialHasher, PasswordDigest, MAX_PASSWORD_BYTES},
    token::TokenIssuer,
};
use crate::store::{Account, AccountRepository, StoreError};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Password policy applied at registration.
///
/// # Errors
/// Returns [`AuthError::Validation`] describing the first rule broken.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    if password.trim().is_empty() {
        return Err(AuthError::validation("Password must not be blank"));
    }
    Ok(())
}

fn normalize_email(raw: &str) -> Result<String, AuthError> {
    email::normalize(raw).map_err(|err| {
        debug!("rejected email: {err}");
        AuthError::validation("Invalid email")
    })
}

pub struct AccountService {
    repository: Arc<dyn AccountRepository>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl AccountService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn AccountRepository>,
        hasher: CredentialHasher,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Create an account for `email` protected by `password`.
    ///
    /// # Errors
    /// `Validation` for a bad email or weak password, `Conflict` when the
    /// normalized email is already registered, `Internal` otherwise.
    #[instrument(skip_all)]
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        let digest = self.hash_password(password).await?;

        match self.repository.create(&email, &digest).await {
            Ok(account) => {
                debug!(account.id = account.id, "account created");
                Ok(account)
            }
            Err(StoreError::AlreadyExists) => Err(AuthError::Conflict),
            Err(err) => Err(AuthError::internal(err)),
        }
    }

    /// Check credentials and issue a bearer token.
    ///
    /// An unknown email and a wrong password are indistinguishable: both
    /// cost one bcrypt comparison and both yield `Unauthorized`.
    ///
    /// # Errors
    /// `Validation` for a malformed email, `Unauthorized` for bad
    /// credentials, `Internal` otherwise.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email)?;

        let account = match self.repository.find_by_email(&email).await {
            Ok(account) => Some(account),
            Err(StoreError::NotFound) => None,
            Err(err) => return Err(AuthError::internal(err)),
        };

        let digest = account.as_ref().map(|account| account.password_hash.clone());
        if !self.verify_password(password, digest).await? {
            debug!("credentials rejected");
            return Err(AuthError::Unauthorized);
        }

        let account = account.ok_or(AuthError::Unauthorized)?;
        let token = self
            .tokens
            .issue(account.id)
            .map_err(AuthError::internal)?;

        debug!(account.id = account.id, "token issued");
        Ok(token)
    }

    /// Resolve a bearer token to the account id it was issued for.
    ///
    /// # Errors
    /// Returns `Unauthorized` for any token that does not verify.
    pub fn authenticate(&self, token: &str) -> Result<u64, AuthError> {
        self.tokens.verify(token).map_err(|err| {
            debug!("token rejected: {err}");
            AuthError::Unauthorized
        })
    }

    /// Fetch the account a verified token points at.
    ///
    /// # Errors
    /// `Unauthorized` if the account no longer resolves, `Internal` otherwise.
    pub async fn account(&self, id: u64) -> Result<Account, AuthError> {
        match self.repository.find_by_id(id).await {
            Ok(account) => Ok(account),
            Err(StoreError::NotFound) => Err(AuthError::Unauthorized),
            Err(err) => Err(AuthError::internal(err)),
        }
    }

    /// # Errors
    /// Returns `Internal` if the backing store is unreachable.
    pub async fn ping(&self) -> Result<(), AuthError> {
        self.repository.ping().await.map_err(AuthError::internal)
    }

    async fn hash_password(&self, password: &str) -> Result<PasswordDigest, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(AuthError::internal)?
            .map_err(AuthError::internal)
    }

    async fn verify_password(
        &self,
        password: &str,
        digest: Option<PasswordDigest>,
    ) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&password, &digest),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(AuthError::internal)
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryAccountStore;
    use secrecy::SecretString;

    const TEST_COST: u32 = 4;
    const PASSWORD: &str = "correct horse battery staple";

    fn service_with(store: Arc<MemoryAccountStore>) -> AccountService {
        AccountService::new(
            store,
            CredentialHasher::new(TEST_COST).expect("valid cost"),
            TokenIssuer::new(SecretString::from("test-secret".to_string())).expect("secret"),
        )
    }

    fn service() -> (AccountService, Arc<MemoryAccountStore>) {
        let store = Arc::new(MemoryAccountStore::new());
        (service_with(store.clone()), store)
    }

    #[tokio::test]
    async fn register_normalizes_and_hashes() -> Result<(), AuthError> {
        let (service, store) = service();
        let account = service.register("  User@Example.COM ", PASSWORD).await?;

        assert_eq!(account.email, "user@example.com");
        let stored = store.accounts();
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].password_hash.as_str(), PASSWORD);
        assert!(stored[0].password_hash.as_str().starts_with("$2"));
        Ok(())
    }

    #[tokio::test]
    async fn register_conflicts_on_same_normalized_email() -> Result<(), AuthError> {
        let (service, _store) = service();
        service.register("user@example.com", PASSWORD).await?;

        let result = service
            .register(" USER@example.com", "a different password")
            .await;
        assert!(matches!(result, Err(AuthError::Conflict)));
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_bad_input() {
        let (service, store) = service();

        let result = service.register("not-an-email", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));

        let result = service.register("user@example.com", "short").await;
        assert!(matches!(result, Err(AuthError::Validation(_))));

        let result = service
            .register("user@example.com", &"x".repeat(MAX_PASSWORD_BYTES + 1))
            .await;
        assert!(matches!(result, Err(AuthError::Validation(_))));

        assert!(store.accounts().is_empty());
    }

    #[tokio::test]
    async fn login_issues_token_for_account() -> Result<(), AuthError> {
        let (service, _store) = service();
        let account = service.register("  User@Example.COM ", PASSWORD).await?;

        let token = service.login("user@example.com", PASSWORD).await?;
        assert!(!token.is_empty());
        assert_eq!(service.authenticate(&token)?, account.id);
        Ok(())
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() -> Result<(), AuthError> {
        let (service, _store) = service();
        service.register("user@example.com", PASSWORD).await?;

        let wrong_password = service.login("user@example.com", "wrong").await;
        let unknown_email = service.login("nobody@example.com", PASSWORD).await;

        assert!(matches!(wrong_password, Err(AuthError::Unauthorized)));
        assert!(matches!(unknown_email, Err(AuthError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_malformed_email() {
        let (service, _store) = service();
        let result = service.login("nope", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn store_outage_is_internal() {
        let service = service_with(Arc::new(MemoryAccountStore::failing()));

        let result = service.register("user@example.com", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));

        let result = service.login("user@example.com", PASSWORD).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));

        assert!(matches!(service.ping().await, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn authenticate_rejects_foreign_tokens() -> Result<(), AuthError> {
        let (service, _store) = service();
        let other = TokenIssuer::new(SecretString::from("other-secret".to_string()))
            .map_err(AuthError::internal)?;
        let token = other.issue(1).map_err(AuthError::internal)?;

        assert!(matches!(
            service.authenticate(&token),
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            service.authenticate("garbage"),
            Err(AuthError::Unauthorized)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn account_lookup_folds_missing_into_unauthorized() -> Result<(), AuthError> {
        let (service, _store) = service();
        let account = service.register("user@example.com", PASSWORD).await?;

        assert_eq!(service.account(account.id).await?.email, "user@example.com");
        assert!(matches!(
            service.account(account.id + 1).await,
            Err(AuthError::Unauthorized)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn serialized_account_has_no_password() -> Result<(), AuthError> {
        let (service, _store) = service();
        let account = service.register("user@example.com", PASSWORD).await?;

        let json = serde_json::to_value(&account).map_err(AuthError::internal)?;
        let object = json.as_object().ok_or(AuthError::NotFound)?;
        assert!(object.contains_key("id"));
        assert!(object.contains_key("email"));
        assert!(object.contains_key("createdAt"));
        assert!(object.contains_key("updatedAt"));
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("passwordHash"));
        assert!(!json.to_string().contains(account.password_hash.as_str()));
        Ok(())
    }

    #[test]
    fn password_policy() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("        ").is_err());
        assert!(validate_password("correct horse").is_ok());
        assert!(validate_password(&"é".repeat(37)).is_err());
        assert!(validate_password(&"é".repeat(36)).is_ok());
    }
}
