//! PostgreSQL pool sizing and connection.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use openvocab_core::{defaults, env};
use openvocab_core::{Error, Result};

/// Pool limits. Lifetime and idle timeout use the core defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::POOL_MAX_CONNECTIONS,
            min_connections: defaults::POOL_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::POOL_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Defaults overridden by `OPENVOCAB_DB_MAX_CONNECTIONS`,
    /// `OPENVOCAB_DB_MIN_CONNECTIONS` and `OPENVOCAB_DB_ACQUIRE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(n) = env::parse_var("OPENVOCAB_DB_MAX_CONNECTIONS")? {
            config.max_connections = n;
        }
        if let Some(n) = env::parse_var("OPENVOCAB_DB_MIN_CONNECTIONS")? {
            config.min_connections = n;
        }
        if let Some(secs) = env::parse_var::<u64>("OPENVOCAB_DB_ACQUIRE_TIMEOUT_SECS")? {
            config.acquire_timeout = Duration::from_secs(secs);
        }
        if config.max_connections == 0 || config.min_connections > config.max_connections {
            return Err(Error::Config(format!(
                "pool needs 0 < min ({}) <= max ({}) connections",
                config.min_connections, config.max_connections
            )));
        }
        Ok(config)
    }
}

/// Open a pool against `database_url`.
pub async fn connect_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Duration::from_secs(defaults::POOL_IDLE_TIMEOUT_SECS))
        .max_lifetime(Duration::from_secs(defaults::POOL_MAX_LIFETIME_SECS))
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        max_connections = config.max_connections,
        pool_size = pool.size(),
        pool_idle = pool.num_idle(),
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Database pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_from_env() {
        std::env::set_var("OPENVOCAB_DB_MAX_CONNECTIONS", "8");
        std::env::set_var("OPENVOCAB_DB_ACQUIRE_TIMEOUT_SECS", "5");
        let config = PoolConfig::from_env().unwrap();
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, defaults::POOL_MIN_CONNECTIONS);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));

        std::env::set_var("OPENVOCAB_DB_MIN_CONNECTIONS", "9");
        assert!(matches!(PoolConfig::from_env(), Err(Error::Config(_))));

        std::env::remove_var("OPENVOCAB_DB_MAX_CONNECTIONS");
        std::env::remove_var("OPENVOCAB_DB_MIN_CONNECTIONS");
        std::env::remove_var("OPENVOCAB_DB_ACQUIRE_TIMEOUT_SECS");
        assert_eq!(PoolConfig::from_env().unwrap(), PoolConfig::default());
    }
}
