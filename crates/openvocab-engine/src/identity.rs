//! Identifier contract for incoming resources.
//!
//! A submission either asks the server to mint identifiers (and must then be
//! blank with no `openskos:uuid`) or carries both a URI and a UUID itself.
//! Resolution is pure; the store is never consulted.

use tracing::debug;

use openvocab_core::namespaces::openskos;
use openvocab_core::uuid_utils::{mint_uri, new_v7};
use openvocab_core::{Error, Resource, Result, Uri};

/// Identifiers a mutation proceeds with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub uri: Uri,
    pub uuid: String,
    /// Whether the identifiers were minted here.
    pub generated: bool,
}

#[derive(Debug, Clone)]
pub struct IdentityResolver {
    uri_base: String,
}

impl IdentityResolver {
    pub fn new(uri_base: impl Into<String>) -> Self {
        Self {
            uri_base: uri_base.into(),
        }
    }

    /// Decide the identifiers for a submitted resource.
    pub fn resolve(&self, resource: &Resource, auto_generate: bool) -> Result<ResolvedIdentity> {
        if auto_generate {
            if let Some(uri) = &resource.uri {
                return Err(Error::InvalidInput(format!(
                    "Identifiers are generated by the server; resource must be blank, got <{}>",
                    uri
                )));
            }
            if resource.uuid().is_some() {
                return Err(Error::InvalidInput(
                    "Identifiers are generated by the server; resource must not carry openskos:uuid"
                        .to_string(),
                ));
            }
            let uuid = new_v7();
            let uri = mint_uri(&self.uri_base, &uuid)?;
            debug!(
                subsystem = "engine",
                component = "identity",
                resource_uri = %uri,
                "Generated identifiers"
            );
            return Ok(ResolvedIdentity {
                uri,
                uuid: uuid.to_string(),
                generated: true,
            });
        }

        let uri = resource.uri.clone().ok_or_else(|| {
            Error::InvalidInput(
                "Resource has no URI (rdf:about); supply one or request generated identifiers"
                    .to_string(),
            )
        })?;
        let uuid = match resource.uuid().map(str::trim) {
            Some(uuid) if !uuid.is_empty() => uuid.to_string(),
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Resource <{}> has no openskos:uuid; supply one or request generated identifiers",
                    uri
                )))
            }
        };
        if resource.property(&openskos::uuid()).len() > 1 {
            return Err(Error::InvalidInput(format!(
                "Resource <{}> carries more than one openskos:uuid",
                uri
            )));
        }
        Ok(ResolvedIdentity {
            uri,
            uuid,
            generated: false,
        })
    }
}
