use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::LogLevel;
use crate::auth::Session;
use crate::powerapps::connection::{Connection, ConnectionPage, POWERAPPS_PROVIDER};
use crate::powerapps::ensure::ConnectionAdmin;

const API_VERSION: &str = "2016-11-01";
const MAX_PAGES: usize = 100;

/// Power Apps API host used when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.powerapps.com";

/// HTTP client for Power Apps connection administration.
pub struct ServiceClient<'a> {
    session: &'a Session,
    base_url: String,
    log_level: LogLevel,
}

impl<'a> ServiceClient<'a> {
    /// Create a new client for the given API host and authenticated session.
    pub fn new(base_url: &str, session: &'a Session, log_level: LogLevel) -> Self {
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
            log_level,
        }
    }

    fn environment(&self) -> &str {
        self.session.environment()
    }

    fn list_url(&self) -> String {
        format!(
            "{}{}/scopes/admin/environments/{}/connections?api-version={}",
            self.base_url,
            POWERAPPS_PROVIDER,
            urlencoding::encode(self.environment()),
            API_VERSION
        )
    }

    fn create_url(&self, connector: &str, connection_id: &str) -> String {
        let filter = format!("environment eq '{}'", self.environment().replace('\'', "''"));
        format!(
            "{}{}/apis/{}/connections/{}?api-version={}&$filter={}",
            self.base_url,
            POWERAPPS_PROVIDER,
            urlencoding::encode(connector),
            connection_id,
            API_VERSION,
            urlencoding::encode(&filter)
        )
    }

    /// Retrieve a single page of connections.
    async fn list_page(&self, url: &str) -> Result<ConnectionPage, String> {
        if matches!(self.log_level, LogLevel::Debug) {
            log::debug!("Url: {:?}", url);
        }

        let token = self.session.access_token().await?;
        let resp = self
            .session
            .client()
            .get(url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;

        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Power Apps API error ({}): {}", status, body));
        }

        resp.json::<ConnectionPage>()
            .await
            .map_err(|e| format!("Failed to parse JSON: {e}"))
    }
}

impl ConnectionAdmin for ServiceClient<'_> {
    /// List every connection in the environment, following `nextLink` paging.
    async fn list_connections(&self) -> Result<Vec<Connection>, String> {
        let mut url = self.list_url();
        let mut connections: Vec<Connection> = vec![];
        let mut page = 1;

        loop {
            let parsed = self.list_page(&url).await?;
            log::debug!(
                "Connections page {}: {} record(s)",
                page,
                parsed.value.len()
            );
            connections.extend(parsed.value);

            let Some(next_link) = parsed.next_link.filter(|link| !link.trim().is_empty()) else {
                break;
            };

            if page >= MAX_PAGES {
                return Err(format!(
                    "Connection listing did not finish after {} pages",
                    MAX_PAGES
                ));
            }

            url = next_link;
            page += 1;
        }

        Ok(connections)
    }

    async fn create_connection(
        &self,
        connector: &str,
        friendly_label: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<Connection, String> {
        let connection_id = uuid::Uuid::new_v4().simple().to_string();
        let url = self.create_url(connector, &connection_id);

        let body = json!({
            "properties": {
                "environment": {
                    "id": format!("{}/environments/{}", POWERAPPS_PROVIDER, self.environment()),
                    "name": self.environment(),
                },
                "displayName": friendly_label,
                "connectionParameters": parameters,
            }
        });

        if matches!(self.log_level, LogLevel::Debug) {
            log::debug!("Url: {:?}", url);
            log::debug!(
                "Connection parameter keys: {:?}",
                parameters.keys().collect::<Vec<_>>()
            );
        }

        let token = self.session.access_token().await?;
        let resp = self
            .session
            .client()
            .put(&url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Power Apps API error ({}): {}", status, body));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse JSON: {e}"))?;

        serde_json::from_value(json).map_err(|e| format!("Unexpected connection payload: {e}"))
    }
}
