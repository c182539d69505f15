use reqwest::Client;

use crate::auth::Session;
use crate::config::Config;
use crate::error::{BootstrapError, Result};
use crate::powerapps::serviceclient::ServiceClient;
use crate::powerapps::{ConnectionAdmin, ConnectorDomain, ensure_connection};
use crate::settings::{ConnectionBindings, PatchReport, patch_settings_file};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub dataverse_connection_id: String,
    pub sharepoint_connection_id: String,
    pub report: PatchReport,
}

pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| BootstrapError::Setup(e.to_string()))
}

/// Ensure both connections through `admin`, then patch the settings file.
pub async fn provision<A: ConnectionAdmin>(admin: &A, config: &Config) -> Result<RunSummary> {
    let mut bindings = ConnectionBindings::new();

    for domain in ConnectorDomain::ALL {
        let parameters = domain.connection_parameters(&config.credentials);
        let id = ensure_connection(
            admin,
            domain.connector_name(),
            domain.friendly_label(),
            &parameters,
        )
        .await?;
        bindings = bindings.bind(domain, id);
    }

    let report = patch_settings_file(
        &config.settings_path,
        &bindings,
        config.match_mode,
        config.dry_run,
    )?;

    let id_for = |domain| bindings.get(domain).unwrap_or_default().to_string();
    Ok(RunSummary {
        dataverse_connection_id: id_for(ConnectorDomain::Dataverse),
        sharepoint_connection_id: id_for(ConnectorDomain::SharePoint),
        report,
    })
}

/// Authenticate, ensure the Dataverse and SharePoint connections, patch settings.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let client = http_client()?;
    let session = Session::authenticate(
        client,
        &config.authority,
        &config.credentials,
        &config.scope,
    )
    .await?;

    let admin = ServiceClient::new(&config.api_url, &session, config.log_level);
    provision(&admin, config).await
}
