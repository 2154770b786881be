//! Store wiring for the command-line client.

use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use tracing::info;

use openvocab_core::{TripleStore, UserStore};
use openvocab_db::{test_fixtures::DEFAULT_TEST_DATABASE_URL, Database};
use openvocab_engine::{EngineConfig, GraphTenantResolver, ResourceManager};
use openvocab_sparql::{SparqlConfig, SparqlTripleStore};

/// Where triples live. Users are always kept in PostgreSQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Postgres,
    Sparql,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Sparql => write!(f, "sparql"),
        }
    }
}

/// Connect the stores and build a resource manager.
///
/// With `config_file` set, engine and SPARQL settings come from its
/// `[engine]` and `[sparql]` tables; otherwise from `OPENVOCAB_*` variables.
pub async fn connect(
    backend: Backend,
    config_file: Option<&Path>,
    migrate: bool,
) -> anyhow::Result<ResourceManager> {
    let engine_config = match config_file {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::from_env()?,
    };

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| DEFAULT_TEST_DATABASE_URL.to_string());
    let db = Database::connect(&database_url).await?;
    if migrate {
        db.migrate().await?;
        info!(subsystem = "cli", component = "backend", "Migrations applied");
    }
    let users: Arc<dyn UserStore> = Arc::new(db.users.clone());

    let store: Arc<dyn TripleStore> = match backend {
        Backend::Postgres => Arc::new(db.triples.clone()),
        Backend::Sparql => {
            let sparql_config = match config_file {
                Some(path) => SparqlConfig::from_file(path)?,
                None => SparqlConfig::from_env()?,
            };
            Arc::new(SparqlTripleStore::new(sparql_config)?)
        }
    };
    info!(
        subsystem = "cli",
        component = "backend",
        backend = %backend,
        "Store connected"
    );

    let tenants = Arc::new(GraphTenantResolver::new(store.clone()));
    Ok(ResourceManager::new(store, users, tenants, engine_config)?)
}
