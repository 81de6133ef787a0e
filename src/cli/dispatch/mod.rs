//! Map parsed arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, database, ARG_PORT, ARG_REQUEST_TIMEOUT};
use anyhow::Result;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 5;

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let request_timeout = Duration::from_secs(
        matches
            .get_one::<u64>(ARG_REQUEST_TIMEOUT)
            .copied()
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
    );

    let database_opts = database::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn: database_opts.dsn,
        max_connections: database_opts.max_connections,
        token_secret: auth_opts.token_secret,
        bcrypt_cost: auth_opts.bcrypt_cost,
        request_timeout,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn builds_server_action() {
        temp_env::with_vars(
            [
                ("VESTIBULE_DSN", Some("postgres://localhost:5432/vestibule")),
                ("VESTIBULE_TOKEN_SECRET", Some("s3cr3t")),
                ("VESTIBULE_PORT", None),
                ("VESTIBULE_BCRYPT_COST", None),
                ("VESTIBULE_MAX_CONNECTIONS", None),
                ("VESTIBULE_REQUEST_TIMEOUT", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["vestibule"]);
                let Ok(Action::Server(args)) = handler(&matches) else {
                    panic!("expected a server action");
                };

                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://localhost:5432/vestibule");
                assert_eq!(args.max_connections, 12);
                assert_eq!(args.token_secret.expose_secret(), "s3cr3t");
                assert_eq!(args.bcrypt_cost, 14);
                assert_eq!(args.request_timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn rejects_non_postgres_dsn() {
        temp_env::with_vars(
            [
                ("VESTIBULE_DSN", Some("mysql://localhost:3306/vestibule")),
                ("VESTIBULE_TOKEN_SECRET", Some("s3cr3t")),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["vestibule"]);
                assert!(handler(&matches).is_err());
            },
        );
    }
}
