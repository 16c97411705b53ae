use crate::{api::APP_USER_AGENT, cli::globals::GlobalArgs, vault};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{info_span, instrument, Instrument};

const TOKEN_SECRET_FIELD: &str = "token_secret";

/// Read the token signing secret from a KV-v2 mount.
///
/// # Errors
/// Returns an error if the Vault request fails or the secret is missing.
#[instrument(skip(globals))]
pub async fn read_token_secret(
    globals: &GlobalArgs,
    kv_mount: &str,
    kv_path: &str,
) -> Result<SecretString> {
    let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
    let path = format!("/v1/{kv_mount}/data/{kv_path}");
    let url = vault::endpoint_url(&globals.vault_url, &path)?;

    let span = info_span!(
        "vault.kv.read",
        http.method = "GET",
        url = %url
    );
    let response = client
        .get(&url)
        .header("X-Vault-Token", globals.vault_token.expose_secret())
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("vault kv read failed: {status} {body}"));
    }

    let json: Value = response.json().await?;
    token_secret_from_kv(&json)
}

fn token_secret_from_kv(json: &Value) -> Result<SecretString> {
    let secret = json
        .get("data")
        .and_then(|data| data.get("data"))
        .and_then(|data| data.get(TOKEN_SECRET_FIELD))
        .and_then(Value::as_str)
        .context("token secret missing from vault response")?;

    if secret.is_empty() {
        return Err(anyhow!("token secret in vault is empty"));
    }

    Ok(SecretString::from(secret.to_string()))
}
