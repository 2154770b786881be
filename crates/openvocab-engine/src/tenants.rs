//! Tenant and set code lookup.
//!
//! Tenants (`org:FormalOrganization`) and sets (`dcmitype:Dataset`) are
//! ordinary resources in the graph, addressed by their `openskos:code`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use openvocab_core::namespaces::{dcterms, openskos};
use openvocab_core::{
    Error, Literal, Resource, ResourceType, Result, TenantContext, TenantResolver, Term, Triple,
    TripleStore, Uri,
};

/// Subjects typed `type_uri` whose `openskos:code` is `code`.
async fn subjects_with_code(
    store: &dyn TripleStore,
    type_uri: &Uri,
    code: &str,
) -> Result<Vec<Uri>> {
    let mut found = Vec::new();
    for subject in store
        .subjects_with(&openskos::code(), &Term::Literal(Literal::plain(code)))
        .await?
    {
        if store.has_type(&subject, type_uri).await? && !found.contains(&subject) {
            found.push(subject);
        }
    }
    Ok(found)
}

/// Resolves tenant codes against tenant resources in the store.
#[derive(Clone)]
pub struct GraphTenantResolver {
    store: Arc<dyn TripleStore>,
}

impl GraphTenantResolver {
    pub fn new(store: Arc<dyn TripleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TenantResolver for GraphTenantResolver {
    async fn code_to_uri(&self, code: &str) -> Result<Option<Uri>> {
        let mut matches = subjects_with_code(
            self.store.as_ref(),
            &ResourceType::Tenant.type_uri(),
            code,
        )
        .await?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(Error::Config(format!(
                "Tenant code '{}' is ambiguous: {} tenants carry it",
                code, n
            ))),
        }
    }
}

/// Fixed code table, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantResolver {
    tenants: HashMap<String, Uri>,
}

impl StaticTenantResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, code: impl Into<String>, uri: Uri) -> Self {
        self.tenants.insert(code.into(), uri);
        self
    }
}

#[async_trait]
impl TenantResolver for StaticTenantResolver {
    async fn code_to_uri(&self, code: &str) -> Result<Option<Uri>> {
        Ok(self.tenants.get(code).cloned())
    }
}

/// Resolves set codes within a tenant.
#[derive(Clone)]
pub struct SetResolver {
    store: Arc<dyn TripleStore>,
}

impl SetResolver {
    pub fn new(store: Arc<dyn TripleStore>) -> Self {
        Self { store }
    }

    /// The set with this code published by the tenant.
    pub async fn resolve(&self, code: &str, tenant: &TenantContext) -> Result<Option<Uri>> {
        let candidates =
            subjects_with_code(self.store.as_ref(), &ResourceType::Set.type_uri(), code).await?;
        for set in candidates {
            let published = Triple::new(set.clone(), dcterms::publisher(), tenant.uri.clone());
            if self.store.contains(&published).await? {
                debug!(
                    subsystem = "engine",
                    component = "tenants",
                    tenant = %tenant.code,
                    set = %set,
                    "Resolved set code"
                );
                return Ok(Some(set));
            }
        }
        Ok(None)
    }

    /// Every set published by a tenant.
    pub async fn sets_for_tenant(&self, tenant_uri: &Uri) -> Result<Vec<Resource>> {
        let set_type = ResourceType::Set.type_uri();
        let mut sets = Vec::new();
        for subject in self
            .store
            .subjects_with(&dcterms::publisher(), &Term::uri(tenant_uri.clone()))
            .await?
        {
            if !self.store.has_type(&subject, &set_type).await? {
                continue;
            }
            if let Some(set) = self.store.fetch_resource(&subject).await? {
                if !sets.contains(&set) {
                    sets.push(set);
                }
            }
        }
        Ok(sets)
    }
}
