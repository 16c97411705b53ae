//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{token, vault};
use anyhow::{anyhow, Result};

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches.get_one::<String>("dsn").cloned();

    let token_opts = token::Options::parse(matches)?;
    let vault_opts = vault::Options::parse(matches)?;

    if token_opts.secret.is_none() && vault_opts.is_none() {
        return Err(anyhow!(
            "missing required argument: --{} or --{}",
            token::ARG_TOKEN_SECRET,
            vault::ARG_VAULT_URL
        ));
    }

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret: token_opts.secret,
        token_issuer: token_opts.issuer,
        access_ttl_seconds: token_opts.access_ttl_seconds,
        refresh_ttl_seconds: token_opts.refresh_ttl_seconds,
        vault: vault_opts,
    }))
}
