//! SPARQL endpoint configuration.
//!
//! Configuration can be loaded from:
//! - TOML files (`[sparql]` table, `${VAR}` placeholders substituted)
//! - Environment variables (`OPENVOCAB_SPARQL_*`)
//!
//! # Example
//!
//! ```rust,no_run
//! use openvocab_sparql::config::SparqlConfig;
//!
//! let config = SparqlConfig::from_env().expect("invalid SPARQL environment");
//! config.validate().expect("invalid SPARQL configuration");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use openvocab_core::{defaults, env};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid environment: {0}")]
    Environment(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for openvocab_core::Error {
    fn from(e: ConfigError) -> Self {
        openvocab_core::Error::Config(e.to_string())
    }
}

impl From<openvocab_core::Error> for ConfigError {
    fn from(e: openvocab_core::Error) -> Self {
        ConfigError::Environment(e.to_string())
    }
}

/// Connection settings for a SPARQL 1.1 endpoint pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlConfig {
    /// Query endpoint (SELECT/ASK).
    pub query_url: String,
    /// Update endpoint (INSERT/DELETE).
    pub update_url: String,
    /// Basic-auth user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    defaults::SPARQL_TIMEOUT_SECS
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            query_url: defaults::SPARQL_QUERY_URL.to_string(),
            update_url: defaults::SPARQL_UPDATE_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: defaults::SPARQL_TIMEOUT_SECS,
        }
    }
}

impl SparqlConfig {
    /// Both endpoints under one dataset base, Fuseki style (`<base>/query`, `<base>/update`).
    pub fn for_dataset(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            query_url: format!("{}/query", base),
            update_url: format!("{}/update", base),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load from environment variables.
    ///
    /// - `OPENVOCAB_SPARQL_URL`: dataset base; sets both endpoints
    /// - `OPENVOCAB_SPARQL_QUERY_URL` / `OPENVOCAB_SPARQL_UPDATE_URL`: explicit endpoints
    /// - `OPENVOCAB_SPARQL_USER` / `OPENVOCAB_SPARQL_PASSWORD`: basic auth
    /// - `OPENVOCAB_SPARQL_TIMEOUT_SECS`: request timeout
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match std::env::var("OPENVOCAB_SPARQL_URL") {
            Ok(base) => Self::for_dataset(&base),
            Err(_) => Self::default(),
        };
        if let Ok(url) = std::env::var("OPENVOCAB_SPARQL_QUERY_URL") {
            config.query_url = url;
        }
        if let Ok(url) = std::env::var("OPENVOCAB_SPARQL_UPDATE_URL") {
            config.update_url = url;
        }
        if let Ok(user) = std::env::var("OPENVOCAB_SPARQL_USER") {
            config.username = Some(user);
        }
        if let Ok(password) = std::env::var("OPENVOCAB_SPARQL_PASSWORD") {
            config.password = Some(password);
        }
        if let Some(secs) = env::parse_var::<u64>("OPENVOCAB_SPARQL_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        debug!(
            subsystem = "sparql",
            component = "config",
            query_url = %config.query_url,
            update_url = %config.update_url,
            timeout_secs = config.timeout_secs,
            "SPARQL configuration loaded from environment"
        );
        Ok(config)
    }

    /// Load from the `[sparql]` table of a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = env::substitute_env_vars(&content)?;

        #[derive(Deserialize)]
        struct TomlRoot {
            sparql: SparqlConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        Ok(root.sparql)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, url) in [("query_url", &self.query_url), ("update_url", &self.update_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "SPARQL {} must start with http:// or https://, got: {}",
                    name, url
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "SPARQL timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::Validation(
                "SPARQL password given without a username".to_string(),
            ));
        }
        Ok(())
    }
}
