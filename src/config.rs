use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LogLevel;
use crate::auth::{Credentials, DEFAULT_AUTHORITY, DEFAULT_SCOPE};
use crate::cli::Cli;
use crate::error::{BootstrapError, Result};
use crate::powerapps::MatchMode;
use crate::powerapps::serviceclient::DEFAULT_API_URL;

/// Optional JSON file with the same values as the command line.
#[derive(Debug, Default, Deserialize)]
pub struct SecretsFile {
    pub environment: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub settings: Option<PathBuf>,
    pub api_url: Option<String>,
    pub authority: Option<String>,
    pub scope: Option<String>,
}

pub fn read_secrets(path: &Path) -> Result<SecretsFile> {
    let contents = fs::read_to_string(path).map_err(|e| {
        BootstrapError::Config(format!("Failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| BootstrapError::Config(format!("Invalid {}: {e}", path.display())))
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub settings_path: PathBuf,
    pub api_url: String,
    pub authority: String,
    pub scope: String,
    pub match_mode: MatchMode,
    pub dry_run: bool,
    pub log_level: LogLevel,
}

fn required(name: &str, flag: Option<String>, file: Option<String>) -> Result<String> {
    flag.or(file)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| BootstrapError::Config(format!("missing required value `{name}`")))
}

fn optional(flag: Option<String>, file: Option<String>, default: &str) -> String {
    flag.or(file)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Merge command line (and environment) values over the secrets file, if any.
    pub fn resolve(cli: Cli) -> Result<Self> {
        let file = match cli.secrets_file.as_deref() {
            Some(path) => read_secrets(path)?,
            None => SecretsFile::default(),
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: Cli, file: SecretsFile) -> Result<Self> {
        let credentials = Credentials {
            environment: required("environment", cli.environment, file.environment)?,
            tenant_id: required("tenant-id", cli.tenant_id, file.tenant_id)?,
            client_id: required("client-id", cli.client_id, file.client_id)?,
            client_secret: required("client-secret", cli.client_secret, file.client_secret)?,
        };

        let settings_path = cli
            .settings
            .or(file.settings)
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| BootstrapError::Config("missing required value `settings`".to_string()))?;

        Ok(Self {
            credentials,
            settings_path,
            api_url: optional(cli.api_url, file.api_url, DEFAULT_API_URL),
            authority: optional(cli.authority, file.authority, DEFAULT_AUTHORITY),
            scope: optional(cli.scope, file.scope, DEFAULT_SCOPE),
            match_mode: if cli.ignore_case {
                MatchMode::IgnoreCase
            } else {
                MatchMode::CaseSensitive
            },
            dry_run: cli.dry_run,
            log_level: cli.log_level.into(),
        })
    }
}
