//! Engine configuration.
//!
//! Settings the mutation pipeline reads at runtime. Loaded from:
//! - defaults in [`openvocab_core::defaults`]
//! - TOML files (`[engine]` table, `${VAR}` placeholders substituted)
//! - environment variables (`OPENVOCAB_*`)
//!
//! ```rust,no_run
//! use openvocab_engine::EngineConfig;
//!
//! let config = EngineConfig::from_env().expect("invalid engine environment");
//! config.validate().expect("invalid engine configuration");
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use openvocab_core::{defaults, env, ConceptStatus, Error, Result};

/// Runtime settings for [`crate::ResourceManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cap on resources returned by one list call.
    pub max_rows: usize,
    /// Wall-clock budget for one operation.
    pub request_timeout: Duration,
    /// Prefix for generated resource URIs.
    pub uri_base: String,
    /// Namespaces whose predicates are treated as custom relations.
    pub custom_relation_namespaces: Vec<String>,
    /// Statuses a request may pick for a new concept.
    pub allowed_initial_statuses: Vec<ConceptStatus>,
    /// Hold a process-wide lock across relation check and write.
    pub serialize_relation_writes: bool,
    /// Node budget for one cycle search.
    pub max_traversal_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rows: defaults::MAX_ROWS,
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            uri_base: defaults::URI_BASE.to_string(),
            custom_relation_namespaces: Vec::new(),
            allowed_initial_statuses: defaults::ALLOWED_INITIAL_STATUSES
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            serialize_relation_writes: false,
            max_traversal_nodes: defaults::MAX_TRAVERSAL_NODES,
        }
    }
}

/// `[engine]` table as written in TOML; absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineTable {
    max_rows: Option<usize>,
    request_timeout_secs: Option<u64>,
    uri_base: Option<String>,
    custom_relation_namespaces: Option<Vec<String>>,
    allowed_initial_statuses: Option<Vec<String>>,
    serialize_relation_writes: Option<bool>,
    max_traversal_nodes: Option<usize>,
}

fn parse_statuses<'a>(values: impl IntoIterator<Item = &'a str>) -> Result<Vec<ConceptStatus>> {
    values
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ConceptStatus>()
                .map_err(|_| Error::Config(format!("Unknown concept status: '{}'", s)))
        })
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl EngineConfig {
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_uri_base(mut self, uri_base: impl Into<String>) -> Self {
        self.uri_base = uri_base.into();
        self
    }

    pub fn with_custom_relation_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.custom_relation_namespaces.push(namespace.into());
        self
    }

    pub fn with_allowed_initial_statuses(mut self, statuses: Vec<ConceptStatus>) -> Self {
        self.allowed_initial_statuses = statuses;
        self
    }

    pub fn with_serialized_relation_writes(mut self, enabled: bool) -> Self {
        self.serialize_relation_writes = enabled;
        self
    }

    pub fn with_max_traversal_nodes(mut self, nodes: usize) -> Self {
        self.max_traversal_nodes = nodes;
        self
    }

    /// Load from environment variables, falling back to defaults.
    ///
    /// - `OPENVOCAB_MAX_ROWS`
    /// - `OPENVOCAB_REQUEST_TIMEOUT_SECS`
    /// - `OPENVOCAB_URI_BASE`
    /// - `OPENVOCAB_CUSTOM_RELATION_NAMESPACES` (comma separated)
    /// - `OPENVOCAB_ALLOWED_INITIAL_STATUSES` (comma separated)
    /// - `OPENVOCAB_SERIALIZE_RELATION_WRITES`
    /// - `OPENVOCAB_MAX_TRAVERSAL_NODES`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(rows) = env::parse_var("OPENVOCAB_MAX_ROWS")? {
            config.max_rows = rows;
        }
        if let Some(secs) = env::parse_var::<u64>("OPENVOCAB_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(base) = std::env::var("OPENVOCAB_URI_BASE") {
            config.uri_base = base;
        }
        if let Ok(raw) = std::env::var("OPENVOCAB_CUSTOM_RELATION_NAMESPACES") {
            config.custom_relation_namespaces = split_list(&raw);
        }
        if let Ok(raw) = std::env::var("OPENVOCAB_ALLOWED_INITIAL_STATUSES") {
            config.allowed_initial_statuses = parse_statuses(raw.split(','))?;
        }
        if let Some(enabled) = env::flag("OPENVOCAB_SERIALIZE_RELATION_WRITES") {
            config.serialize_relation_writes = enabled;
        }
        if let Some(nodes) = env::parse_var("OPENVOCAB_MAX_TRAVERSAL_NODES")? {
            config.max_traversal_nodes = nodes;
        }
        debug!(
            subsystem = "engine",
            component = "config",
            max_rows = config.max_rows,
            request_timeout_secs = config.request_timeout.as_secs(),
            uri_base = %config.uri_base,
            serialize_relation_writes = config.serialize_relation_writes,
            "Engine configuration loaded from environment"
        );
        Ok(config)
    }

    /// Load from the `[engine]` table of a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = env::substitute_env_vars(&content)?;

        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            engine: EngineTable,
        }

        let root: TomlRoot = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        let table = root.engine;

        let mut config = Self::default();
        if let Some(rows) = table.max_rows {
            config.max_rows = rows;
        }
        if let Some(secs) = table.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(base) = table.uri_base {
            config.uri_base = base;
        }
        if let Some(namespaces) = table.custom_relation_namespaces {
            config.custom_relation_namespaces = namespaces;
        }
        if let Some(statuses) = table.allowed_initial_statuses {
            config.allowed_initial_statuses = parse_statuses(statuses.iter().map(String::as_str))?;
        }
        if let Some(enabled) = table.serialize_relation_writes {
            config.serialize_relation_writes = enabled;
        }
        if let Some(nodes) = table.max_traversal_nodes {
            config.max_traversal_nodes = nodes;
        }
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(Error::Config("max_rows must be greater than zero".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_traversal_nodes == 0 {
            return Err(Error::Config(
                "max_traversal_nodes must be greater than zero".to_string(),
            ));
        }
        if !self.uri_base.starts_with("http://") && !self.uri_base.starts_with("https://") {
            return Err(Error::Config(format!(
                "uri_base must start with http:// or https://, got: {}",
                self.uri_base
            )));
        }
        if self.allowed_initial_statuses.is_empty() {
            return Err(Error::Config(
                "allowed_initial_statuses must not be empty".to_string(),
            ));
        }
        if self.allowed_initial_statuses.contains(&ConceptStatus::Deleted) {
            return Err(Error::Config(
                "deleted cannot be an initial concept status".to_string(),
            ));
        }
        if let Some(ns) = self
            .custom_relation_namespaces
            .iter()
            .find(|ns| !ns.ends_with('/') && !ns.ends_with('#'))
        {
            return Err(Error::Config(format!(
                "custom relation namespace must end with '/' or '#': {}",
                ns
            )));
        }
        Ok(())
    }
}
