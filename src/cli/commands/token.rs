use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

use crate::auth::token::MAX_TTL_SECONDS;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_ISSUER: &str = "token-issuer";
pub const ARG_ACCESS_TTL: &str = "access-token-ttl-seconds";
pub const ARG_REFRESH_TTL: &str = "refresh-token-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("HMAC secret used to sign tokens, at least 32 bytes")
                .long_help(
                    "HMAC secret used to sign tokens, at least 32 bytes. When omitted the secret is read from Vault.",
                )
                .env("MEMBERSHIP_TOKEN_SECRET")
                .hide_env_values(true)
                .required_unless_present("vault-url"),
        )
        .arg(
            Arg::new(ARG_TOKEN_ISSUER)
                .long(ARG_TOKEN_ISSUER)
                .help("Issuer written to and expected in every token")
                .env("MEMBERSHIP_TOKEN_ISSUER")
                .default_value("membership"),
        )
        .arg(
            Arg::new(ARG_ACCESS_TTL)
                .long(ARG_ACCESS_TTL)
                .help("Access token lifetime in seconds, at most one year")
                .env("MEMBERSHIP_ACCESS_TOKEN_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TTL)
                .long(ARG_REFRESH_TTL)
                .help("Refresh token lifetime in seconds, at most one year")
                .env("MEMBERSHIP_REFRESH_TOKEN_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_TTL_SECONDS)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub secret: Option<SecretString>,
    pub issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if the lifetimes are inconsistent.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .map(|secret| SecretString::from(secret.clone()));
        let issuer = matches
            .get_one::<String>(ARG_TOKEN_ISSUER)
            .cloned()
            .unwrap_or_else(|| "membership".to_string());
        let access_ttl_seconds = matches
            .get_one::<i64>(ARG_ACCESS_TTL)
            .copied()
            .unwrap_or(900);
        let refresh_ttl_seconds = matches
            .get_one::<i64>(ARG_REFRESH_TTL)
            .copied()
            .unwrap_or(604_800);

        if access_ttl_seconds >= refresh_ttl_seconds {
            return Err(anyhow!(
                "--{ARG_ACCESS_TTL} ({access_ttl_seconds}) must be shorter than --{ARG_REFRESH_TTL} ({refresh_ttl_seconds})"
            ));
        }

        Ok(Self {
            secret,
            issuer,
            access_ttl_seconds,
            refresh_ttl_seconds,
        })
    }
}
