use std::path::PathBuf;

use thiserror::Error;

/// Failure classes for a bootstrap run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The HTTP client stack could not be initialised.
    #[error("setup failed: {0}")]
    Setup(String),

    /// A required invocation value is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The service principal could not authenticate.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Listing connections in the environment failed.
    #[error("failed to look up {connector} connections: {msg}")]
    Lookup {
        /// Connector identifier that was being looked up.
        connector: String,
        /// Underlying failure.
        msg: String,
    },

    /// Creating a connection failed.
    #[error("failed to create {connector} connection: {msg}")]
    Create {
        /// Connector identifier that was being created.
        connector: String,
        /// Underlying failure.
        msg: String,
    },

    /// The settings file could not be read or written.
    #[error("settings file {}: {source}", .path.display())]
    File {
        /// Path of the settings file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON or lacks `ConnectionReferences`.
    #[error("invalid deployment settings: {0}")]
    Parse(String),
}

impl BootstrapError {
    pub fn lookup(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Lookup {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    pub fn create(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Create {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
