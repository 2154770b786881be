//! Acting users and their roles.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rdf::Uri;

/// Role of a user, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    User,
    Editor,
    Administrator,
    Root,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Editor => "editor",
            Self::Administrator => "administrator",
            Self::Root => "root",
        }
    }

    /// Whether this role reaches at least `other`.
    pub fn at_least(&self, other: Role) -> bool {
        *self >= other
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "user" => Ok(Self::User),
            "editor" => Ok(Self::Editor),
            "administrator" | "admin" => Ok(Self::Administrator),
            "root" => Ok(Self::Root),
            _ => Err(Error::InvalidInput(format!("Unknown role: {}", s))),
        }
    }
}

/// A user as seen by the mutation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    /// Plain key as presented by the caller. Stores may keep only a hash.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// URI stamped as creator/modifier on resources.
    pub uri: Uri,
    pub role: Role,
    pub tenant_code: String,
    pub api_allowed: bool,
    pub active: bool,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        uri: Uri,
        role: Role,
        tenant_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
            uri,
            role,
            tenant_code: tenant_code.into(),
            api_allowed: true,
            active: true,
        }
    }

    pub fn is_api_allowed(&self) -> bool {
        self.api_allowed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_root(&self) -> bool {
        self.role == Role::Root
    }
}
