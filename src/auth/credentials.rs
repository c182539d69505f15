use std::{
    collections::HashMap,
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use reqwest::Client;
use serde_json::Value;

/// Service principal identity bound to one target environment.
#[derive(Clone)]
pub struct Credentials {
    /// Power Platform environment identifier.
    pub environment: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("environment", &self.environment)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

pub struct ClientCredentialsToken {
    pub access_token: String,
    pub expires_at: u64,
}

pub fn token_url(authority: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority.trim_end_matches('/'),
        tenant_id
    )
}

pub async fn fetch_client_credentials_token_with_expiry(
    client: &Client,
    authority: &str,
    credentials: &Credentials,
    scope: &str,
) -> Result<ClientCredentialsToken, String> {
    let token_url = token_url(authority, &credentials.tenant_id);

    let mut params = HashMap::new();
    params.insert("client_id", credentials.client_id.as_str());
    params.insert("client_secret", credentials.client_secret.as_str());
    params.insert("scope", scope);
    params.insert("grant_type", "client_credentials");

    log::debug!("Requesting client credentials token from {}", token_url);

    let resp = client
        .post(&token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| format!("Token request failed: {e}"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(format!("Token endpoint returned {}: {}", status, body));
    }

    let json: Value = resp
        .json()
        .await
        .map_err(|e| format!("Failed to parse token response: {e}"))?;

    parse_token_response(&json, now_secs()?)
}

pub(crate) fn parse_token_response(json: &Value, now: u64) -> Result<ClientCredentialsToken, String> {
    let access_token = json
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or("No access_token in response")?;
    let expires_in = json
        .get("expires_in")
        .and_then(|v| v.as_u64())
        .ok_or("No expires_in in response")?;

    if access_token.trim().is_empty() {
        return Err("Access token was empty".to_string());
    }

    Ok(ClientCredentialsToken {
        access_token: access_token.to_string(),
        expires_at: now + expires_in,
    })
}

fn now_secs() -> Result<u64, String> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| e.to_string())?
        .as_secs())
}
