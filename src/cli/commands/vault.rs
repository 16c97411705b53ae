use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_VAULT_URL: &str = "vault-url";
pub const ARG_VAULT_ROLE_ID: &str = "vault-role-id";
pub const ARG_VAULT_SECRET_ID: &str = "vault-secret-id";
pub const ARG_VAULT_KV_MOUNT: &str = "vault-kv-mount";
pub const ARG_VAULT_KV_PATH: &str = "vault-kv-path";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VAULT_URL)
                .long(ARG_VAULT_URL)
                .help("Vault approle login URL, example: https://vault.tld:8200/v1/auth/<approle>/login")
                .env("MEMBERSHIP_VAULT_URL")
                .requires_all([ARG_VAULT_ROLE_ID, ARG_VAULT_SECRET_ID]),
        )
        .arg(
            Arg::new(ARG_VAULT_ROLE_ID)
                .long(ARG_VAULT_ROLE_ID)
                .help("Vault role id")
                .env("MEMBERSHIP_VAULT_ROLE_ID"),
        )
        .arg(
            Arg::new(ARG_VAULT_SECRET_ID)
                .long(ARG_VAULT_SECRET_ID)
                .help("Vault secret id")
                .env("MEMBERSHIP_VAULT_SECRET_ID")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_VAULT_KV_MOUNT)
                .long(ARG_VAULT_KV_MOUNT)
                .help("Vault KV-v2 mount holding the token secret")
                .env("MEMBERSHIP_VAULT_KV_MOUNT")
                .default_value("secret/membership"),
        )
        .arg(
            Arg::new(ARG_VAULT_KV_PATH)
                .long(ARG_VAULT_KV_PATH)
                .help("Vault KV-v2 path holding the token secret")
                .env("MEMBERSHIP_VAULT_KV_PATH")
                .default_value("config"),
        )
}

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub role_id: String,
    pub secret_id: SecretString,
    pub kv_mount: String,
    pub kv_path: String,
}

impl Options {
    /// `None` when no Vault URL was given.
    ///
    /// # Errors
    /// Returns an error if the URL is set but the approle credentials are not.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Option<Self>> {
        let Some(url) = matches.get_one::<String>(ARG_VAULT_URL).cloned() else {
            return Ok(None);
        };

        let role_id = matches
            .get_one::<String>(ARG_VAULT_ROLE_ID)
            .cloned()
            .context("missing required argument: --vault-role-id")?;
        let secret_id = matches
            .get_one::<String>(ARG_VAULT_SECRET_ID)
            .map(|secret_id| SecretString::from(secret_id.clone()))
            .context("missing required argument: --vault-secret-id")?;
        let kv_mount = matches
            .get_one::<String>(ARG_VAULT_KV_MOUNT)
            .cloned()
            .unwrap_or_else(|| "secret/membership".to_string());
        let kv_path = matches
            .get_one::<String>(ARG_VAULT_KV_PATH)
            .cloned()
            .unwrap_or_else(|| "config".to_string());

        Ok(Some(Self {
            url,
            role_id,
            secret_id,
            kv_mount,
            kv_path,
        }))
    }
}
