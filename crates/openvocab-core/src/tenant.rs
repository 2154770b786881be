//! Tenant context resolved once per request.

use serde::{Deserialize, Serialize};

use crate::rdf::{Resource, Term, Uri};
use crate::namespaces::openskos;

/// A tenant's short code paired with its URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    pub code: String,
    pub uri: Uri,
}

impl TenantContext {
    pub fn new(code: impl Into<String>, uri: Uri) -> Self {
        Self {
            code: code.into(),
            uri,
        }
    }

    /// Whether a resource is stamped as belonging to this tenant.
    ///
    /// Tenant resources themselves match on their own URI.
    pub fn owns(&self, resource: &Resource) -> bool {
        if resource.uri.as_ref() == Some(&self.uri) {
            return true;
        }
        resource
            .property(&openskos::tenant())
            .iter()
            .any(|t| matches!(t, Term::Uri { value } if value == &self.uri))
    }
}

impl std::fmt::Display for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.code, self.uri)
    }
}
