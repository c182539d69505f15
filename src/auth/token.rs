use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::auth::credentials::{Credentials, fetch_client_credentials_token_with_expiry};
use crate::error::BootstrapError;

const REFRESH_SKEW_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: Option<u64>,
}

#[derive(Clone, Debug)]
pub enum AuthConfig {
    ClientCredentials {
        authority: String,
        credentials: Credentials,
        scope: String,
    },
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn is_expiring_soon(expires_at: Option<u64>) -> bool {
    let Some(exp) = expires_at else {
        return true;
    };
    now_secs() + REFRESH_SKEW_SECS >= exp
}

pub async fn fetch_token(client: &Client, auth: &AuthConfig) -> Result<CachedToken, String> {
    match auth {
        AuthConfig::ClientCredentials {
            authority,
            credentials,
            scope,
        } => {
            let token =
                fetch_client_credentials_token_with_expiry(client, authority, credentials, scope)
                    .await?;

            Ok(CachedToken {
                access_token: token.access_token,
                expires_at: Some(token.expires_at),
            })
        }
    }
}

/// Authenticated session for one service principal and environment.
///
/// Holds the HTTP client and a token cache; the token is refreshed transparently
/// once it is within five minutes of expiry.
pub struct Session {
    client: Client,
    auth: AuthConfig,
    environment: String,
    cache: Mutex<Option<CachedToken>>,
}

impl Session {
    /// Authenticate immediately, failing fast when the service principal is rejected.
    pub async fn authenticate(
        client: Client,
        authority: &str,
        credentials: &Credentials,
        scope: &str,
    ) -> Result<Self, BootstrapError> {
        let auth = AuthConfig::ClientCredentials {
            authority: authority.to_string(),
            credentials: credentials.clone(),
            scope: scope.to_string(),
        };

        let token = fetch_token(&client, &auth)
            .await
            .map_err(BootstrapError::Auth)?;

        log::info!(
            "Authenticated client {} against tenant {}",
            credentials.client_id,
            credentials.tenant_id
        );

        Ok(Self {
            client,
            auth,
            environment: credentials.environment.clone(),
            cache: Mutex::new(Some(token)),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_token(client: Client, credentials: &Credentials, token: CachedToken) -> Self {
        Self {
            client,
            auth: AuthConfig::ClientCredentials {
                authority: crate::auth::DEFAULT_AUTHORITY.to_string(),
                credentials: credentials.clone(),
                scope: crate::auth::DEFAULT_SCOPE.to_string(),
            },
            environment: credentials.environment.clone(),
            cache: Mutex::new(Some(token)),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Current bearer token, refreshed if it is about to expire.
    pub async fn access_token(&self) -> Result<String, String> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if !cached.access_token.trim().is_empty() && !is_expiring_soon(cached.expires_at) {
                return Ok(cached.access_token.clone());
            }
        }

        log::debug!("Access token missing or expiring, refreshing");
        let refreshed = fetch_token(&self.client, &self.auth).await?;
        let access_token = refreshed.access_token.clone();
        *cache = Some(refreshed);
        Ok(access_token)
    }
}
