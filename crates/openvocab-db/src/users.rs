//! API-key user store.
//!
//! Keys are shown once at creation; only their SHA-256 hash is persisted.

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use openvocab_core::{new_v7, Error, Result, Role, Uri, User, UserStore};

/// Request for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub uri: Uri,
    pub role: Role,
    pub tenant_code: String,
    pub api_allowed: bool,
}

/// A freshly created user together with its plain API key.
#[derive(Debug, Clone)]
pub struct CreatedUser {
    pub id: Uuid,
    pub user: User,
}

/// PostgreSQL implementation of [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash an API key using SHA256.
    pub fn hash_key(api_key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(api_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn generate_key() -> String {
        format!("ov_key_{}", Uuid::new_v4().simple())
    }

    /// Create a user and return it with its generated API key.
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<CreatedUser> {
        let id = new_v7();
        let key = Self::generate_key();
        let key_prefix: String = key.chars().take(12).collect();
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO app_user (
                id, name, key_hash, key_prefix, uri, role, tenant_code,
                api_allowed, active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, $9, $9)"#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(Self::hash_key(&key))
        .bind(&key_prefix)
        .bind(req.uri.as_str())
        .bind(req.role.as_str())
        .bind(&req.tenant_code)
        .bind(req.api_allowed)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "users",
            op = "create",
            actor = %req.name,
            tenant = %req.tenant_code,
            "User created"
        );

        Ok(CreatedUser {
            id,
            user: User {
                name: req.name,
                api_key: key,
                uri: req.uri,
                role: req.role,
                tenant_code: req.tenant_code,
                api_allowed: req.api_allowed,
                active: true,
            },
        })
    }

    /// Block or unblock a user.
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE app_user SET active = $1, updated_at = $2 WHERE id = $3")
            .bind(active)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Allow or forbid API access for a user.
    pub async fn set_api_allowed(&self, id: Uuid, api_allowed: bool) -> Result<bool> {
        let result =
            sqlx::query("UPDATE app_user SET api_allowed = $1, updated_at = $2 WHERE id = $3")
                .bind(api_allowed)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"SELECT name, uri, role, tenant_code, api_allowed, active
            FROM app_user
            WHERE key_hash = $1"#,
        )
        .bind(Self::hash_key(api_key))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Some(r) = row else {
            return Ok(None);
        };

        let uri: String = r.get("uri");
        let role: String = r.get("role");
        Ok(Some(User {
            name: r.get("name"),
            api_key: api_key.to_string(),
            uri: Uri::parse(uri)?,
            role: role.parse()?,
            tenant_code: r.get("tenant_code"),
            api_allowed: r.get("api_allowed"),
            active: r.get("active"),
        }))
    }
}
