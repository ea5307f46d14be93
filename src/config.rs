//! Configuration management
//!
//! Everything is read once at startup: process settings come from the
//! environment through figment, upstream servers are loaded by
//! [`crate::registry::UpstreamRegistry::from_env`], and the AWS
//! integration is enabled by the presence of its credential variables.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Process/server settings
    pub server: ServerConfig,
    /// AWS integration settings
    pub aws: AwsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the dashboard assets
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            static_dir: ".".to_string(),
        }
    }
}

/// AWS integration settings.
///
/// Credentials themselves are never stored here; the AWS SDK reads them
/// from its default provider chain. This struct only records whether the
/// integration is enabled and for which region.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// Whether both credential variables were present and non-empty
    pub enabled: bool,
    /// Region to query
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            region: "us-east-1".to_string(),
        }
    }
}

impl AwsConfig {
    /// Derive the integration state from a variable source. Enabled iff
    /// both `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` are set and
    /// non-empty.
    pub fn from_vars<F>(vars: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| vars(key).is_some_and(|v| !v.is_empty());
        Self {
            enabled: present("AWS_ACCESS_KEY_ID") && present("AWS_SECRET_ACCESS_KEY"),
            region: vars("AWS_REGION")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "us-east-1".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when
    /// present (missing files are fine). Recognized process variables:
    /// `HOST`, `PORT`, `STATIC_DIR`.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value cannot be parsed into
    /// its field type (e.g. a non-numeric `PORT`).
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded env file");
        }

        let server: ServerConfig = Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Env::raw().only(&["HOST", "PORT", "STATIC_DIR"]))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        let aws = AwsConfig::from_vars(|key| std::env::var(key).ok());

        Ok(Self { server, aws })
    }
}
