use crate::{
    auth::{AccountService, CredentialHasher, TokenIssuer},
    cli::commands::database::redact_dsn,
    store::PgAccountStore,
    vestibule,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub max_connections: u32,
    pub token_secret: SecretString,
    pub bcrypt_cost: u32,
    pub request_timeout: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is rejected, the database is
/// unreachable, migrations fail, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let hasher = CredentialHasher::new(args.bcrypt_cost).context("Invalid bcrypt cost")?;
    let tokens = TokenIssuer::new(args.token_secret).context("Invalid token secret")?;

    let store = PgAccountStore::connect(&args.dsn, args.max_connections).await?;

    let version = store.server_version().await?;
    info!("Connected to database: {version}");

    store.migrate().await?;

    let service = Arc::new(AccountService::new(Arc::new(store), hasher, tokens));

    vestibule::new(args.port, service, args.request_timeout).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("dsn", redact_dsn(&args.dsn)),
        ("max_connections", args.max_connections.to_string()),
        ("bcrypt_cost", args.bcrypt_cost.to_string()),
        (
            "request_timeout",
            format!("{}s", args.request_timeout.as_secs()),
        ),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(vestibule::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
