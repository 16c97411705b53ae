use crate::{
    api,
    auth::{AuthService, CredentialStore, MemoryStore, PgStore, TokenConfig, TokenIssuer},
    cli::{commands::vault::Options as VaultOptions, globals::GlobalArgs},
    vault,
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub token_secret: Option<SecretString>,
    pub token_issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub vault: Option<VaultOptions>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the token secret cannot be obtained, the database is
/// unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let secret = match (args.token_secret, &args.vault) {
        (Some(secret), _) => secret,
        (None, Some(vault_opts)) => token_secret_from_vault(vault_opts).await?,
        (None, None) => return Err(anyhow!("a token secret or Vault configuration is required")),
    };

    let issuer = TokenIssuer::new(
        TokenConfig::new(secret)
            .with_issuer(args.token_issuer)
            .with_access_ttl_seconds(args.access_ttl_seconds)
            .with_refresh_ttl_seconds(args.refresh_ttl_seconds),
    )
    .context("Invalid token configuration")?;
    let token_config = issuer.config();
    info!(
        issuer = token_config.issuer(),
        access_ttl_seconds = token_config.access_ttl_seconds(),
        refresh_ttl_seconds = token_config.refresh_ttl_seconds(),
        "token issuer configured"
    );

    let store: Arc<dyn CredentialStore> = if let Some(dsn) = &args.dsn {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;
        info!("using postgres credential store");
        Arc::new(PgStore::new(pool))
    } else {
        warn!("no --dsn given, members are kept in memory and lost on restart");
        Arc::new(MemoryStore::new())
    };

    let service = Arc::new(AuthService::new(store, issuer));
    debug!("auth service: {:?}", service);

    api::new(args.port, service).await
}

async fn token_secret_from_vault(opts: &VaultOptions) -> Result<SecretString> {
    let mut globals = GlobalArgs::new(opts.url.clone());

    let (token, lease_duration) =
        vault::approle_login(&globals.vault_url, opts.secret_id.expose_secret(), &opts.role_id)
            .await
            .context("Vault approle login failed")?;
    debug!("vault token lease duration: {lease_duration}s");

    globals.set_token(SecretString::from(token));

    vault::kv::read_token_secret(&globals, &opts.kv_mount, &opts.kv_path)
        .await
        .context("Could not read the token secret from Vault")
}
