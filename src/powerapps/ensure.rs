use std::collections::BTreeMap;

use crate::error::BootstrapError;
use crate::powerapps::connection::Connection;

/// Administrative operations on the connections of one environment.
#[allow(async_fn_in_trait)]
pub trait ConnectionAdmin {
    /// All connections visible in the target environment.
    async fn list_connections(&self) -> Result<Vec<Connection>, String>;

    /// Create a connection of `connector` and return it as assigned by the service.
    async fn create_connection(
        &self,
        connector: &str,
        friendly_label: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<Connection, String>;
}

/// Return the id of an existing `connector_name` connection, creating one if none exists.
///
/// The first matching connection in list order is authoritative. Concurrent
/// callers may both observe "no match" and both create; callers are expected
/// to run sequentially.
pub async fn ensure_connection<A: ConnectionAdmin>(
    admin: &A,
    connector_name: &str,
    friendly_label: &str,
    parameters: &BTreeMap<String, String>,
) -> Result<String, BootstrapError> {
    if connector_name.trim().is_empty() {
        return Err(BootstrapError::Config(
            "connector name must not be empty".to_string(),
        ));
    }

    let connections = admin
        .list_connections()
        .await
        .map_err(|msg| BootstrapError::lookup(connector_name, msg))?;

    if let Some(existing) = connections
        .iter()
        .find(|connection| connection.connector_name() == Some(connector_name))
    {
        log::info!(
            "{} connection already exists: {}",
            friendly_label,
            existing.name
        );
        return Ok(existing.name.clone());
    }

    log::info!(
        "No {} connection found, creating one ({})",
        friendly_label,
        connector_name
    );

    let created = admin
        .create_connection(connector_name, friendly_label, parameters)
        .await
        .map_err(|msg| BootstrapError::create(connector_name, msg))?;

    if created.name.trim().is_empty() {
        return Err(BootstrapError::create(
            connector_name,
            "service returned a connection without an id",
        ));
    }

    log::info!("Created {} connection: {}", friendly_label, created.name);
    Ok(created.name)
}
