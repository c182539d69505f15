use std::collections::BTreeMap;
use std::fmt;

use crate::auth::Credentials;

/// How logical names are compared against domain keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    CaseSensitive,
    IgnoreCase,
}

/// Connector families the bootstrapper provisions.
///
/// Declaration order is match priority: a logical name containing both
/// keywords binds to the first domain listed in [`ConnectorDomain::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConnectorDomain {
    Dataverse,
    SharePoint,
}

impl ConnectorDomain {
    pub const ALL: [ConnectorDomain; 2] = [ConnectorDomain::Dataverse, ConnectorDomain::SharePoint];

    /// Substring looked for in connection reference logical names.
    pub fn keyword(self) -> &'static str {
        match self {
            ConnectorDomain::Dataverse => "dataverse",
            ConnectorDomain::SharePoint => "sharepoint",
        }
    }

    pub fn connector_name(self) -> &'static str {
        match self {
            ConnectorDomain::Dataverse => "shared_commondataserviceforapps",
            ConnectorDomain::SharePoint => "shared_sharepointonline",
        }
    }

    pub fn friendly_label(self) -> &'static str {
        match self {
            ConnectorDomain::Dataverse => "Dataverse",
            ConnectorDomain::SharePoint => "SharePoint",
        }
    }

    /// Connection parameters used when a new connection has to be created.
    pub fn connection_parameters(self, credentials: &Credentials) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        if let ConnectorDomain::Dataverse = self {
            params.insert("token:TenantId".to_string(), credentials.tenant_id.clone());
            params.insert("token:clientId".to_string(), credentials.client_id.clone());
            params.insert(
                "token:clientSecret".to_string(),
                credentials.client_secret.clone(),
            );
            params.insert(
                "token:grantType".to_string(),
                "client_credentials".to_string(),
            );
        }
        params
    }

    pub fn matches(self, logical_name: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::CaseSensitive => logical_name.contains(self.keyword()),
            MatchMode::IgnoreCase => logical_name.to_lowercase().contains(self.keyword()),
        }
    }

    /// First domain, in priority order, whose keyword occurs in `logical_name`.
    pub fn match_logical_name(logical_name: &str, mode: MatchMode) -> Option<ConnectorDomain> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.matches(logical_name, mode))
    }
}

impl fmt::Display for ConnectorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.friendly_label())
    }
}
