use super::{Account, AccountRepository, StoreError};
use crate::auth::password::PasswordDigest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    migrate::Migrator,
    postgres::{PgPoolOptions, PgRow},
    Connection, PgPool, Row,
};
use std::time::Duration;
use tracing::{info, info_span, Instrument};

const ACCOUNT_COLUMNS: &str = "id, email, password, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `dsn`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be reached.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections)
            .max_lifetime(Duration::from_secs(60 * 30))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self::new(pool))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Report the server version string.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn server_version(&self) -> Result<String> {
        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&self.pool)
            .await
            .context("Failed to query database version")?;
        Ok(version)
    }

    /// Apply the embedded schema migrations and return the resulting
    /// schema version.
    ///
    /// # Errors
    /// Returns an error if a migration fails to apply.
    pub async fn migrate(&self) -> Result<Option<i64>> {
        info!("Starting database migration");

        let before = self.schema_version().await?;
        for migration in MIGRATOR
            .iter()
            .filter(|migration| before.map_or(true, |version| migration.version > version))
        {
            info!(
                "Applying migration {} {}",
                migration.version, migration.description
            );
        }

        MIGRATOR
            .run(&self.pool)
            .await
            .context("Failed to apply migrations")?;

        let after = self.schema_version().await?;
        info!("{}", migration_summary(before, after));
        Ok(after)
    }

    /// Highest successfully applied migration, `None` on a fresh database.
    async fn schema_version(&self) -> Result<Option<i64>> {
        let tracked: bool =
            sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .context("Failed to look up migration table")?;
        if !tracked {
            return Ok(None);
        }

        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(version) FROM _sqlx_migrations WHERE success",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to query schema version")
    }
}

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

fn migration_summary(before: Option<i64>, after: Option<i64>) -> String {
    match (before, after) {
        (_, None) => "No migrations applied".to_string(),
        (Some(old), Some(new)) if old == new => {
            format!("No new migrations to apply, schema at version {new}")
        }
        (Some(old), Some(new)) => format!("Database migrated from version {old} to {new}"),
        (None, Some(new)) => format!("Database migrated to version {new}"),
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let id: i64 = row.try_get("id")?;
    let id = u64::try_from(id).map_err(|_| StoreError::InvalidRow(format!("negative id {id}")))?;

    Ok(Account {
        id,
        email: row.try_get("email")?,
        password_hash: PasswordDigest::from_stored(row.try_get("password")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl AccountRepository for PgAccountStore {
    async fn create(
        &self,
        email: &str,
        password_hash: &PasswordDigest,
    ) -> Result<Account, StoreError> {
        let query = format!(
            "INSERT INTO accounts (email, password) VALUES ($1, $2) RETURNING {ACCOUNT_COLUMNS}"
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );

        match sqlx::query(&query)
            .bind(email)
            .bind(password_hash.as_str())
            .fetch_one(&self.pool)
            .instrument(span)
            .await
        {
            Ok(row) => account_from_row(&row),
            Err(err) if is_unique_violation(&err) => Err(StoreError::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?
            .ok_or(StoreError::NotFound)?;

        account_from_row(&row)
    }

    async fn find_by_id(&self, id: u64) -> Result<Account, StoreError> {
        // Ids above i64::MAX cannot exist in a BIGINT column.
        let Ok(id) = i64::try_from(id) else {
            return Err(StoreError::NotFound);
        };

        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?
            .ok_or(StoreError::NotFound)?;

        account_from_row(&row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}
