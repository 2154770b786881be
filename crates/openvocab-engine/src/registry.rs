//! Tenant-defined relation predicates.
//!
//! A custom relation is an `owl:ObjectProperty` resource stamped with the
//! owning tenant. The store is the registry; nothing is cached.

use std::sync::Arc;

use openvocab_core::namespaces::{openskos, owl, rdf};
use openvocab_core::{Result, TenantContext, Term, Triple, TripleStore, Uri};

#[derive(Clone)]
pub struct RelationRegistry {
    store: Arc<dyn TripleStore>,
    custom_namespaces: Vec<String>,
}

impl RelationRegistry {
    pub fn new(store: Arc<dyn TripleStore>, custom_namespaces: Vec<String>) -> Self {
        Self {
            store,
            custom_namespaces,
        }
    }

    /// Whether a predicate lies in a configured custom relation namespace.
    pub fn in_custom_namespace(&self, predicate: &Uri) -> bool {
        self.custom_namespaces
            .iter()
            .any(|ns| predicate.in_namespace(ns))
    }

    /// Whether any tenant defines the predicate as a relation.
    pub async fn is_defined(&self, predicate: &Uri) -> Result<bool> {
        self.store.has_type(predicate, &owl::object_property()).await
    }

    /// Whether the predicate is a custom relation at all, registered or not.
    pub async fn is_custom_predicate(&self, predicate: &Uri) -> Result<bool> {
        if self.in_custom_namespace(predicate) {
            return Ok(true);
        }
        self.is_defined(predicate).await
    }

    /// Whether the tenant has registered the predicate.
    pub async fn is_registered(&self, tenant: &TenantContext, predicate: &Uri) -> Result<bool> {
        if !self.is_defined(predicate).await? {
            return Ok(false);
        }
        self.store
            .contains(&Triple::new(
                predicate.clone(),
                openskos::tenant(),
                tenant.uri.clone(),
            ))
            .await
    }

    /// Relation predicates registered by a tenant.
    pub async fn registered_for(&self, tenant: &TenantContext) -> Result<Vec<Uri>> {
        let mut registered = Vec::new();
        for subject in self
            .store
            .subjects_with(&rdf::type_(), &Term::uri(owl::object_property()))
            .await?
        {
            let owned = Triple::new(subject.clone(), openskos::tenant(), tenant.uri.clone());
            if self.store.contains(&owned).await? && !registered.contains(&subject) {
                registered.push(subject);
            }
        }
        Ok(registered)
    }
}
