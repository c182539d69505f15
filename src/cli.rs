use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::LogLevel;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Debug,
    Information,
}

impl From<LogLevelArg> for LogLevel {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Information => LogLevel::Information,
        }
    }
}

/// Ensure the Dataverse and SharePoint connections exist for a service principal,
/// then point the deployment settings' connection references at them.
#[derive(Debug, Parser)]
#[command(name = "pp-connection-bootstrap")]
#[command(version, about)]
pub struct Cli {
    /// Target Power Platform environment identifier
    #[arg(long, env = "PP_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Azure AD tenant of the service principal
    #[arg(long, env = "PP_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Application (client) id of the service principal
    #[arg(long, env = "PP_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret of the service principal
    #[arg(long, env = "PP_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Deployment settings JSON file to patch
    #[arg(long, env = "PP_DEPLOYMENT_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// JSON file supplying any of the values above
    #[arg(long)]
    pub secrets_file: Option<PathBuf>,

    /// Power Apps API host
    #[arg(long)]
    pub api_url: Option<String>,

    /// Microsoft identity authority
    #[arg(long)]
    pub authority: Option<String>,

    /// OAuth scope requested for the Power Apps API
    #[arg(long)]
    pub scope: Option<String>,

    /// Match logical names without regard to case
    #[arg(long)]
    pub ignore_case: bool,

    /// Report which references would change without writing the settings file
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value_t = LogLevelArg::Information)]
    pub log_level: LogLevelArg,
}
