//! # openvocab-db
//!
//! PostgreSQL storage for openvocab.
//!
//! This crate provides:
//! - Connection pool sizing from the environment
//! - [`PgTripleStore`], the `triple` table behind the [`TripleStore`] contract
//! - [`PgUserStore`], API-key user lookup
//!
//! ## Example
//!
//! ```rust,ignore
//! use openvocab_db::Database;
//! use openvocab_core::TripleStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/openvocab").await?;
//!     db.migrate().await?;
//!     let found = db.triples.fetch_resource(&"http://example.com/c1".parse()?).await?;
//!     println!("{:?}", found);
//!     Ok(())
//! }
//! ```

pub mod pool;
pub mod test_fixtures;
pub mod triples;
pub mod users;

pub use openvocab_core::{Error, Result, TripleStore, UserStore};
pub use pool::{connect_pool, PoolConfig};
pub use triples::PgTripleStore;
pub use users::{CreateUserRequest, CreatedUser, PgUserStore};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Triple store over the `triple` table.
    pub triples: PgTripleStore,
    /// API-key users.
    pub users: PgUserStore,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            triples: PgTripleStore::new(pool.clone()),
            users: PgUserStore::new(pool.clone()),
            pool,
        }
    }

    /// Connect with pool limits from the environment.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let config = PoolConfig::from_env()?;
        Ok(Self::new(connect_pool(database_url, &config).await?))
    }

    /// Connect using `DATABASE_URL`, falling back to the test database.
    pub async fn connect_from_env() -> Result<Self> {
        Self::connect(&test_fixtures::test_database_url()).await
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
