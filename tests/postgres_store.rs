//! Exercises `PgAccountStore` against a live database.
//!
//! Set `VESTIBULE_TEST_DSN` to a disposable PostgreSQL database to run these;
//! without it every test returns early.

use anyhow::Result;
use ulid::Ulid;
use vestibule::{
    auth::CredentialHasher,
    store::{AccountRepository, PgAccountStore, StoreError},
};

async fn store() -> Result<Option<PgAccountStore>> {
    let Ok(dsn) = std::env::var("VESTIBULE_TEST_DSN") else {
        eprintln!("Skipping: VESTIBULE_TEST_DSN not set");
        return Ok(None);
    };

    let store = PgAccountStore::connect(&dsn, 2).await?;
    store.migrate().await?;
    Ok(Some(store))
}

fn unique_email() -> String {
    format!("{}@example.com", Ulid::new().to_string().to_lowercase())
}

#[tokio::test]
async fn create_and_find() -> Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };
    let digest = CredentialHasher::new(4)?.hash("correct horse battery staple")?;
    let email = unique_email();

    let created = store.create(&email, &digest).await?;
    assert_eq!(created.email, email);
    assert_eq!(created.password_hash, digest);

    let by_email = store.find_by_email(&email).await?;
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_email.password_hash, digest);

    let by_id = store.find_by_id(created.id).await?;
    assert_eq!(by_id.email, email);
    Ok(())
}

#[tokio::test]
async fn migrating_twice_keeps_the_schema_version() -> Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };

    let first = store.migrate().await?;
    let second = store.migrate().await?;
    assert!(first.is_some());
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };
    let hasher = CredentialHasher::new(4)?;
    let email = unique_email();

    store.create(&email, &hasher.hash("first password")?).await?;
    let result = store.create(&email, &hasher.hash("second password")?).await;

    assert!(matches!(result, Err(StoreError::AlreadyExists)));
    Ok(())
}

#[tokio::test]
async fn missing_accounts_are_not_found() -> Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };

    assert!(matches!(
        store.find_by_email(&unique_email()).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.find_by_id(u64::MAX).await,
        Err(StoreError::NotFound)
    ));
    store.ping().await?;
    Ok(())
}
