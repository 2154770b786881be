//! Inbound-reference check before a resource is removed.

use std::sync::Arc;

use tracing::debug;

use openvocab_core::namespaces::{openskos, rdf};
use openvocab_core::{ConceptStatus, Result, Term, Triple, TriplePattern, TripleStore, Uri};

/// Blocks deletion of resources other resources still point at.
///
/// References held by soft-deleted resources do not count.
#[derive(Clone)]
pub struct DeletionGuard {
    store: Arc<dyn TripleStore>,
}

impl DeletionGuard {
    pub fn new(store: Arc<dyn TripleStore>) -> Self {
        Self { store }
    }

    /// Live triples from other subjects whose object is `uri`.
    pub async fn inbound_references(&self, uri: &Uri) -> Result<Vec<Triple>> {
        let incoming = self
            .store
            .find_triples(&TriplePattern::any().object(Term::uri(uri.clone())), None)
            .await?;

        let mut live = Vec::new();
        for triple in incoming {
            if &triple.subject == uri || triple.predicate == rdf::type_() {
                continue;
            }
            let retired = Triple::new(
                triple.subject.clone(),
                openskos::status(),
                ConceptStatus::Deleted.to_term(),
            );
            if self.store.contains(&retired).await? {
                continue;
            }
            live.push(triple);
        }
        Ok(live)
    }

    pub async fn can_delete(&self, uri: &Uri) -> Result<bool> {
        let references = self.inbound_references(uri).await?;
        debug!(
            subsystem = "engine",
            component = "deletion",
            resource_uri = %uri,
            result_count = references.len(),
            "Checked inbound references"
        );
        Ok(references.is_empty())
    }
}
