use crate::auth::password::DEFAULT_COST;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub bcrypt_cost: u32,
}

impl Options {
    /// Parse credential arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the token secret is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let token_secret = match matches.get_one::<String>(ARG_TOKEN_SECRET) {
            Some(value) if !value.trim().is_empty() => SecretString::from(value.clone()),
            _ => anyhow::bail!("missing required argument: --{ARG_TOKEN_SECRET}"),
        };

        let bcrypt_cost = matches
            .get_one::<u32>(ARG_BCRYPT_COST)
            .copied()
            .unwrap_or(DEFAULT_COST);

        Ok(Self {
            token_secret,
            bcrypt_cost,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long("token-secret")
                .help("Shared secret used to sign and verify bearer tokens")
                .env("VESTIBULE_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long("bcrypt-cost")
                .help("bcrypt work factor for new password digests")
                .env("VESTIBULE_BCRYPT_COST")
                .default_value("14")
                .value_parser(clap::value_parser!(u32).range(4..=31)),
        )
}
