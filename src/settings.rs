use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{BootstrapError, Result};
use crate::powerapps::connection::{connection_path, connector_path};
use crate::powerapps::{ConnectorDomain, MatchMode};

const CONNECTION_REFERENCES: &str = "ConnectionReferences";
const LOGICAL_NAME: &str = "LogicalName";
const CONNECTION_ID: &str = "ConnectionId";
const CONNECTOR_ID: &str = "ConnectorId";
const UTF8_BOM: char = '\u{feff}';

/// Connection id ensured for each domain.
#[derive(Debug, Clone, Default)]
pub struct ConnectionBindings {
    ids: BTreeMap<ConnectorDomain, String>,
}

impl ConnectionBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, domain: ConnectorDomain, connection_id: impl Into<String>) -> Self {
        self.ids.insert(domain, connection_id.into());
        self
    }

    pub fn get(&self, domain: ConnectorDomain) -> Option<&str> {
        self.ids.get(&domain).map(String::as_str)
    }
}

/// Outcome of a patch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Number of entries in `ConnectionReferences`.
    pub total: usize,
    /// Entries rewritten, per domain.
    pub patched: BTreeMap<ConnectorDomain, usize>,
}

impl PatchReport {
    pub fn patched_total(&self) -> usize {
        self.patched.values().sum()
    }
}

/// Point every matching connection reference in `document` at its bound connection.
///
/// Entries are visited in order; entries that match no domain, lack a string
/// `LogicalName`, or whose domain has no binding are left untouched.
pub fn patch_document(
    document: &mut Value,
    bindings: &ConnectionBindings,
    mode: MatchMode,
) -> Result<PatchReport> {
    let references = document
        .as_object_mut()
        .ok_or_else(|| BootstrapError::Parse("top-level JSON value must be an object".to_string()))?
        .get_mut(CONNECTION_REFERENCES)
        .ok_or_else(|| BootstrapError::Parse(format!("missing `{}`", CONNECTION_REFERENCES)))?
        .as_array_mut()
        .ok_or_else(|| BootstrapError::Parse(format!("`{}` must be an array", CONNECTION_REFERENCES)))?;

    let mut report = PatchReport {
        total: references.len(),
        ..PatchReport::default()
    };

    for reference in references.iter_mut() {
        let Some(entry) = reference.as_object_mut() else {
            continue;
        };
        let Some(logical_name) = entry.get(LOGICAL_NAME).and_then(Value::as_str) else {
            continue;
        };
        let Some(domain) = ConnectorDomain::match_logical_name(logical_name, mode) else {
            log::debug!("Leaving connection reference {} untouched", logical_name);
            continue;
        };
        let Some(connection_id) = bindings.get(domain) else {
            continue;
        };

        log::info!(
            "Binding connection reference {} to {} connection {}",
            logical_name,
            domain,
            connection_id
        );

        let connector = domain.connector_name();
        entry.insert(
            CONNECTION_ID.to_string(),
            Value::String(connection_path(connector, connection_id)),
        );
        entry.insert(
            CONNECTOR_ID.to_string(),
            Value::String(connector_path(connector)),
        );
        *report.patched.entry(domain).or_default() += 1;
    }

    Ok(report)
}

/// Parse deployment settings text, tolerating a leading byte-order mark.
pub fn parse_settings(contents: &str) -> Result<Value> {
    let contents = contents.strip_prefix(UTF8_BOM).unwrap_or(contents);
    serde_json::from_str(contents).map_err(|e| BootstrapError::Parse(e.to_string()))
}

/// Render deployment settings as UTF-8 JSON without a byte-order mark.
pub fn render_settings(document: &Value) -> Result<String> {
    let mut rendered =
        serde_json::to_string_pretty(document).map_err(|e| BootstrapError::Parse(e.to_string()))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Read, patch and (unless `dry_run`) rewrite the settings file at `path`.
///
/// Nothing is written when the file cannot be read or parsed.
pub fn patch_settings_file(
    path: &Path,
    bindings: &ConnectionBindings,
    mode: MatchMode,
    dry_run: bool,
) -> Result<PatchReport> {
    let contents = fs::read_to_string(path).map_err(|e| BootstrapError::file(path, e))?;
    let mut document = parse_settings(&contents)?;
    let report = patch_document(&mut document, bindings, mode)?;

    if dry_run {
        log::info!(
            "Dry run: {} of {} connection reference(s) would be updated in {}",
            report.patched_total(),
            report.total,
            path.display()
        );
        return Ok(report);
    }

    let rendered = render_settings(&document)?;
    fs::write(path, rendered).map_err(|e| BootstrapError::file(path, e))?;

    log::info!(
        "Updated {} of {} connection reference(s) in {}",
        report.patched_total(),
        report.total,
        path.display()
    );
    Ok(report)
}

/// Point Dataverse and SharePoint connection references in the file at `path`
/// to the given connection ids.
pub fn patch_settings(
    path: &Path,
    dataverse_connection_id: &str,
    sharepoint_connection_id: &str,
) -> Result<PatchReport> {
    let bindings = ConnectionBindings::new()
        .bind(ConnectorDomain::Dataverse, dataverse_connection_id)
        .bind(ConnectorDomain::SharePoint, sharepoint_connection_id);
    patch_settings_file(path, &bindings, MatchMode::CaseSensitive, false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    const DATAVERSE_CONNECTION: &str =
        "/providers/Microsoft.PowerApps/apis/shared_commondataserviceforapps/connections/abc123";
    const DATAVERSE_CONNECTOR: &str =
        "/providers/Microsoft.PowerApps/apis/shared_commondataserviceforapps";
    const SHAREPOINT_CONNECTION: &str =
        "/providers/Microsoft.PowerApps/apis/shared_sharepointonline/connections/def456";

    fn bindings() -> ConnectionBindings {
        ConnectionBindings::new()
            .bind(ConnectorDomain::Dataverse, "abc123")
            .bind(ConnectorDomain::SharePoint, "def456")
    }

    fn sample() -> Value {
        json!({
            "EnvironmentVariables": [{ "SchemaName": "new_Url", "Value": "https://contoso" }],
            "ConnectionReferences": [
                { "LogicalName": "new_dataverse", "ConnectionId": "OLD", "ConnectorId": "OLD" },
                { "LogicalName": "new_sharepointsite", "ConnectionId": "OLD", "ConnectorId": "OLD", "Note": 7 },
                { "LogicalName": "new_other", "ConnectionId": "KEEP", "ConnectorId": "KEEP" }
            ]
        })
    }

    #[test]
    fn patches_matching_references_only() {
        let mut document = sample();
        let report = patch_document(&mut document, &bindings(), MatchMode::CaseSensitive).unwrap();

        let refs = &document["ConnectionReferences"];
        assert_eq!(refs[0]["ConnectionId"], DATAVERSE_CONNECTION);
        assert_eq!(refs[0]["ConnectorId"], DATAVERSE_CONNECTOR);
        assert_eq!(refs[1]["ConnectionId"], SHAREPOINT_CONNECTION);
        assert_eq!(
            refs[1]["ConnectorId"],
            "/providers/Microsoft.PowerApps/apis/shared_sharepointonline"
        );
        assert_eq!(refs[1]["Note"], 7);
        assert_eq!(refs[2]["ConnectionId"], "KEEP");
        assert_eq!(refs[2]["ConnectorId"], "KEEP");
        assert_eq!(document["EnvironmentVariables"], sample()["EnvironmentVariables"]);

        assert_eq!(report.total, 3);
        assert_eq!(report.patched_total(), 2);
    }

    #[test]
    fn no_match_means_no_mutation() {
        let original = json!({
            "ConnectionReferences": [
                { "LogicalName": "new_outlook", "ConnectionId": "A", "ConnectorId": "B" },
                { "ConnectionId": "no-name" },
                "not-an-object"
            ]
        });
        let mut document = original.clone();
        let report = patch_document(&mut document, &bindings(), MatchMode::CaseSensitive).unwrap();

        assert_eq!(document, original);
        assert_eq!(report.patched_total(), 0);
    }

    #[test]
    fn matching_is_case_sensitive_unless_asked() {
        let original = json!({
            "ConnectionReferences": [{ "LogicalName": "new_Dataverse", "ConnectionId": "OLD" }]
        });

        let mut document = original.clone();
        patch_document(&mut document, &bindings(), MatchMode::CaseSensitive).unwrap();
        assert_eq!(document, original);

        patch_document(&mut document, &bindings(), MatchMode::IgnoreCase).unwrap();
        assert_eq!(document["ConnectionReferences"][0]["ConnectionId"], DATAVERSE_CONNECTION);
    }

    #[test]
    fn unbound_domain_is_skipped() {
        let mut document = sample();
        let only_dataverse = ConnectionBindings::new().bind(ConnectorDomain::Dataverse, "abc123");
        patch_document(&mut document, &only_dataverse, MatchMode::CaseSensitive).unwrap();
        assert_eq!(document["ConnectionReferences"][1]["ConnectionId"], "OLD");
    }

    #[test]
    fn missing_collection_is_parse_error() {
        let mut document = json!({ "EnvironmentVariables": [] });
        let err = patch_document(&mut document, &bindings(), MatchMode::CaseSensitive).unwrap_err();
        assert!(matches!(err, BootstrapError::Parse(_)));

        let mut document = json!({ "ConnectionReferences": {} });
        let err = patch_document(&mut document, &bindings(), MatchMode::CaseSensitive).unwrap_err();
        assert!(matches!(err, BootstrapError::Parse(_)));
    }

    #[test]
    fn deep_nesting_survives_round_trip() {
        let mut nested = json!("leaf");
        for level in 0..12 {
            nested = json!({ format!("level{level}"): nested });
        }
        let mut document = json!({ "ConnectionReferences": [], "Deep": nested.clone() });

        patch_document(&mut document, &bindings(), MatchMode::CaseSensitive).unwrap();
        let reparsed = parse_settings(&render_settings(&document).unwrap()).unwrap();

        assert_eq!(reparsed["Deep"], nested);
    }

    #[test]
    fn key_order_is_preserved() {
        let text = r#"{"Zeta":1,"ConnectionReferences":[{"LogicalName":"x","Z":1,"A":2}],"Alpha":2}"#;
        let document = parse_settings(text).unwrap();
        let rendered = serde_json::to_string(&document).unwrap();
        assert_eq!(rendered, text);
    }

    #[test]
    fn untouched_numbers_keep_their_text() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{"Big":123456789012345678901234567890,"Price":1.10,"Exp":1e2,"ConnectionReferences":[{"LogicalName":"new_other","ConnectionId":"KEEP","Id":18446744073709551616}]}"#,
        )
        .unwrap();

        let report = patch_settings(file.path(), "abc123", "def456").unwrap();
        assert_eq!(report.patched_total(), 0);

        let written = fs::read_to_string(file.path()).unwrap();
        assert!(written.contains(r#""Big": 123456789012345678901234567890"#), "{written}");
        assert!(written.contains(r#""Price": 1.10"#), "{written}");
        assert!(written.contains(r#""Exp": 1e2"#), "{written}");
        assert!(written.contains(r#""Id": 18446744073709551616"#), "{written}");
    }

    #[test]
    fn file_is_rewritten_without_bom() {
        let file = NamedTempFile::new().unwrap();
        let text = format!("\u{feff}{}", serde_json::to_string(&sample()).unwrap());
        fs::write(file.path(), text).unwrap();

        let report = patch_settings(file.path(), "abc123", "def456").unwrap();
        assert_eq!(report.patched_total(), 2);

        let bytes = fs::read(file.path()).unwrap();
        assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        let written: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(written["ConnectionReferences"][0]["ConnectionId"], DATAVERSE_CONNECTION);
    }

    #[test]
    fn malformed_json_is_not_overwritten() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "{ not json").unwrap();

        let err = patch_settings(file.path(), "abc123", "def456").unwrap_err();

        assert!(matches!(err, BootstrapError::Parse(_)));
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "{ not json");
    }

    #[test]
    fn missing_file_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = patch_settings(&dir.path().join("absent.json"), "a", "b").unwrap_err();
        assert!(matches!(err, BootstrapError::File { .. }));
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let file = NamedTempFile::new().unwrap();
        let text = serde_json::to_string(&sample()).unwrap();
        fs::write(file.path(), &text).unwrap();

        let report =
            patch_settings_file(file.path(), &bindings(), MatchMode::CaseSensitive, true).unwrap();

        assert_eq!(report.patched_total(), 2);
        assert_eq!(fs::read_to_string(file.path()).unwrap(), text);
    }
}
