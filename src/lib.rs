/// Pipeline wiring: authenticate, ensure connections, patch settings.
pub mod app;
/// Service principal authentication against Microsoft identity.
pub mod auth;
/// Command line surface.
pub mod cli;
/// Resolved run configuration.
pub mod config;
/// Error taxonomy for a bootstrap run.
pub mod error;
/// Power Apps connection types, admin client and the connection ensurer.
pub mod powerapps;
/// Deployment settings patching.
pub mod settings;

pub use error::{BootstrapError, Result};

/// Logging verbosity for bootstrap operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Emit verbose debug output, including request URLs and payloads.
    Debug,
    /// Emit standard informational output.
    Information,
}

impl Default for LogLevel {
    /// Defaults to `Information` logging.
    fn default() -> Self {
        LogLevel::Information
    }
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "info,powerplatform_connection_bootstrap=debug",
            LogLevel::Information => "info",
        }
    }
}
