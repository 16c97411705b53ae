//! Minimal Vault client: approle login and a KV-v2 read for the token secret.

pub mod kv;

use crate::api::APP_USER_AGENT;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info_span, instrument, Instrument};
use url::Url;

/// Build `scheme://host:port{endpoint}` from the configured login URL.
///
/// # Errors
/// Returns an error if the URL has no host or an unsupported scheme.
#[instrument]
pub fn endpoint_url(vault_url: &str, endpoint: &str) -> Result<String> {
    let url = Url::parse(vault_url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{endpoint}");

    debug!("endpoint URL: {}", endpoint_url);

    Ok(endpoint_url)
}

/// Login to Vault using AppRole, returns the client token and its lease duration.
/// Create a secret ID with:
/// vault write -f auth/approle/role/membership/secret-id
///
/// # Errors
/// Returns an error if the request fails or the response has no client token.
#[instrument(skip(sid))]
pub async fn approle_login(vault_url: &str, sid: &str, rid: &str) -> Result<(String, u64)> {
    let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

    let login_payload = json!({
        "role_id": rid,
        "secret_id": sid
    });

    debug!("login URL: {}, role ID: {}", vault_url, rid);

    let span = info_span!("vault.approle.login", http.method = "POST", url = %vault_url);
    let response = client
        .post(vault_url)
        .json(&login_payload)
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or_default();

        return Err(anyhow!(
            "{} - {}, {}",
            vault_url,
            status,
            json_response["errors"][0].as_str().unwrap_or("")
        ));
    }

    let json_response: Value = response.json().await?;
    parse_login_response(&json_response)
}

fn parse_login_response(json_response: &Value) -> Result<(String, u64)> {
    let token = json_response["auth"]["client_token"]
        .as_str()
        .context("Error parsing JSON response: no client_token found")?;
    let lease_duration = json_response["auth"]["lease_duration"]
        .as_u64()
        .unwrap_or(1800);

    Ok((token.to_string(), lease_duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn endpoint_url_uses_default_ports() -> Result<()> {
        assert_eq!(
            endpoint_url("https://vault.tld/v1/auth/approle/login", "/v1/secret/data/x")?,
            "https://vault.tld:443/v1/secret/data/x"
        );
        assert_eq!(
            endpoint_url("http://127.0.0.1:8200/v1/auth/approle/login", "/v1/sys/health")?,
            "http://127.0.0.1:8200/v1/sys/health"
        );
        Ok(())
    }

    #[test]
    fn endpoint_url_rejects_unknown_scheme() {
        assert!(endpoint_url("ftp://vault.tld/login", "/v1/x").is_err());
    }

    #[test]
    fn login_response_parsing() -> Result<()> {
        let (token, lease) = parse_login_response(&json!({
            "auth": {"client_token": "s.abc", "lease_duration": 600}
        }))?;
        assert_eq!(token, "s.abc");
        assert_eq!(lease, 600);

        let (_, lease) = parse_login_response(&json!({"auth": {"client_token": "s.abc"}}))?;
        assert_eq!(lease, 1800);

        assert!(parse_login_response(&json!({"errors": ["denied"]})).is_err());
        Ok(())
    }
}
