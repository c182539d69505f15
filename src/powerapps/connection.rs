use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider prefix shared by every Power Apps API resource path.
pub const POWERAPPS_PROVIDER: &str = "/providers/Microsoft.PowerApps";

/// Resource path of a connector, e.g. `/providers/Microsoft.PowerApps/apis/shared_sharepointonline`.
pub fn connector_path(connector: &str) -> String {
    format!("{}/apis/{}", POWERAPPS_PROVIDER, connector)
}

/// Resource path of a concrete connection of `connector`.
pub fn connection_path(connector: &str, connection_id: &str) -> String {
    format!("{}/connections/{}", connector_path(connector), connection_id)
}

/// Power Apps connection as returned by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Connection identifier assigned by the service.
    pub name: String,
    /// Full resource path of the connection.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: ConnectionProperties,
}

/// Properties block of a connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperties {
    /// Connector resource path, e.g. `/providers/Microsoft.PowerApps/apis/shared_commondataserviceforapps`.
    #[serde(default)]
    pub api_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub environment: Option<Value>,
    #[serde(default)]
    pub statuses: Vec<Value>,
    /// Additional fields returned by the API.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Connection {
    /// Connector identifier this connection instantiates.
    pub fn connector_name(&self) -> Option<&str> {
        if let Some(api_id) = self.properties.api_id.as_deref() {
            return api_id.rsplit('/').find(|segment| !segment.is_empty());
        }

        let id = self.id.as_deref()?;
        let (_, rest) = id.split_once("/apis/")?;
        rest.split('/').next().filter(|segment| !segment.is_empty())
    }
}

/// Paged list wrapper returned by Power Apps list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ConnectionPage {
    #[serde(default)]
    pub value: Vec<Connection>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}
