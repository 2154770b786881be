//! Concept-to-concept relation integrity.
//!
//! Every relation edge a mutation would introduce is checked, in order, for:
//!
//! 1. self-loops, always a `Conflict`
//! 2. an existing, not soft-deleted concept as object, else `Reference`
//! 3. a known predicate (standard SKOS relation or a custom relation the
//!    tenant registered), else `InvalidRelation`
//! 4. duplicates, `Conflict` (symmetric and match predicates in both
//!    directions)
//! 5. cycles, `Conflict`, for hierarchical and custom predicates
//!
//! Inverse edges are never materialised. The cycle search instead walks the
//! semantic closure: `a broader b` and `b narrower a` both make `b` a parent
//! of `a`, as do their transitive variants.
//!
//! Each check is a separate store round trip; nothing here holds the store
//! between check and write. See [`crate::EngineConfig::serialize_relation_writes`].

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, trace};

use openvocab_core::namespaces::{openskos, skos};
use openvocab_core::{
    ConceptStatus, Error, Resource, ResourceType, ResourceTypeRegistry, Result, TenantContext,
    Term, Triple, TriplePattern, TripleStore, Uri,
};

use crate::registry::RelationRegistry;

/// How a relation predicate behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `broader`/`narrower` and their transitive variants. `upward` is true
    /// when the object is the parent.
    Hierarchical { upward: bool },
    /// `related`, `relatedMatch`, `exactMatch`, `closeMatch`.
    Symmetric,
    /// `broadMatch`, `narrowMatch`, `mappingRelation`. Directed, but an edge
    /// and its reverse count as the same edge.
    Match,
    /// `semanticRelation`.
    Mapping,
    /// Tenant-defined predicate.
    Custom,
}

impl RelationKind {
    pub fn is_symmetric(&self) -> bool {
        matches!(self, RelationKind::Symmetric)
    }

    /// Whether `b p a` duplicates `a p b`.
    pub fn is_reverse_duplicate(&self) -> bool {
        matches!(self, RelationKind::Symmetric | RelationKind::Match)
    }

    pub fn is_cycle_checked(&self) -> bool {
        matches!(self, RelationKind::Hierarchical { .. } | RelationKind::Custom)
    }
}

/// Classify a standard SKOS relation predicate.
///
/// Custom relations are not standard and yield `None`; see
/// [`RelationIntegrityChecker::classify_edge`].
pub fn classify(predicate: &Uri) -> Option<RelationKind> {
    let p = predicate;
    if *p == skos::broader() || *p == skos::broader_transitive() {
        Some(RelationKind::Hierarchical { upward: true })
    } else if *p == skos::narrower() || *p == skos::narrower_transitive() {
        Some(RelationKind::Hierarchical { upward: false })
    } else if *p == skos::related()
        || *p == skos::related_match()
        || *p == skos::exact_match()
        || *p == skos::close_match()
    {
        Some(RelationKind::Symmetric)
    } else if *p == skos::broad_match()
        || *p == skos::narrow_match()
        || *p == skos::mapping_relation()
    {
        Some(RelationKind::Match)
    } else if *p == skos::semantic_relation() {
        Some(RelationKind::Mapping)
    } else {
        None
    }
}

/// Predicates followed from a node towards its parents.
struct Walk {
    /// `node p parent`
    forward: Vec<Uri>,
    /// `parent p node`
    backward: Vec<Uri>,
}

impl Walk {
    fn for_edge(predicate: &Uri, kind: RelationKind) -> Option<Self> {
        match kind {
            RelationKind::Hierarchical { .. } => Some(Self {
                forward: vec![skos::broader(), skos::broader_transitive()],
                backward: vec![skos::narrower(), skos::narrower_transitive()],
            }),
            RelationKind::Custom => Some(Self {
                forward: vec![predicate.clone()],
                backward: Vec::new(),
            }),
            RelationKind::Symmetric | RelationKind::Match | RelationKind::Mapping => None,
        }
    }
}

#[derive(Clone)]
pub struct RelationIntegrityChecker {
    store: Arc<dyn TripleStore>,
    registry: RelationRegistry,
    types: Arc<ResourceTypeRegistry>,
    max_traversal_nodes: usize,
}

impl RelationIntegrityChecker {
    pub fn new(
        store: Arc<dyn TripleStore>,
        registry: RelationRegistry,
        types: Arc<ResourceTypeRegistry>,
        max_traversal_nodes: usize,
    ) -> Self {
        Self {
            store,
            registry,
            types,
            max_traversal_nodes,
        }
    }

    /// Classify a predicate used as a relation edge within a tenant.
    pub async fn classify_edge(
        &self,
        predicate: &Uri,
        tenant: &TenantContext,
    ) -> Result<RelationKind> {
        if let Some(kind) = classify(predicate) {
            return Ok(kind);
        }
        if !self.registry.is_custom_predicate(predicate).await? {
            return Err(Error::InvalidRelation(format!(
                "<{}> is not a concept relation",
                predicate
            )));
        }
        if !self.registry.is_registered(tenant, predicate).await? {
            return Err(Error::InvalidRelation(format!(
                "Custom relation <{}> is not registered for tenant '{}'",
                predicate, tenant.code
            )));
        }
        Ok(RelationKind::Custom)
    }

    /// Check every relation edge on a concept about to be written.
    ///
    /// With `stored`, edges the stored version already has are retained
    /// without re-checking; only new edges are validated. The cycle search
    /// sees the store with the submitted concept's edges in place of the
    /// stored ones.
    pub async fn check_concept_relations(
        &self,
        concept: &Resource,
        stored: Option<&Resource>,
        tenant: &TenantContext,
    ) -> Result<()> {
        let subject = concept.require_uri()?;
        let spec = self.types.spec(ResourceType::Concept)?;

        for predicate in concept.predicates() {
            if classify(predicate).is_none() && spec.allows_predicate(predicate) {
                continue;
            }

            let mut seen: HashSet<&Uri> = HashSet::new();
            let mut fresh = Vec::new();
            for value in concept.property(predicate) {
                let object = value.as_uri().ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "Relation <{}> must point at a concept URI, got literal '{}'",
                        predicate,
                        value.lexical()
                    ))
                })?;
                if object == subject {
                    return Err(self_loop(subject, predicate));
                }
                if !seen.insert(object) {
                    return Err(Error::Conflict(format!(
                        "Edge <{}> <{}> <{}> is listed twice",
                        subject, predicate, object
                    )));
                }
                if stored.is_some_and(|s| s.property(predicate).contains(value)) {
                    trace!(
                        subsystem = "engine",
                        component = "relations",
                        resource_uri = %subject,
                        predicate = %predicate,
                        object_uri = %object,
                        "Retained stored edge"
                    );
                    continue;
                }
                self.require_target(predicate, object).await?;
                fresh.push(object);
            }

            let kind = self.classify_edge(predicate, tenant).await?;
            for object in fresh {
                self.check_new_edge(subject, predicate, object, kind, Some(concept))
                    .await?;
            }
        }
        Ok(())
    }

    /// Check one edge for the single-edge add/remove operations.
    ///
    /// For removal the edge must exist (in either direction for symmetric
    /// predicates), else `NotFound`. Removal skips the self-loop and target
    /// checks so dangling edges can still be cleaned up.
    pub async fn check_single_edge(
        &self,
        subject: &Uri,
        predicate: &Uri,
        object: &Uri,
        for_deletion: bool,
        tenant: &TenantContext,
    ) -> Result<RelationKind> {
        if !for_deletion {
            if subject == object {
                return Err(self_loop(subject, predicate));
            }
            self.require_target(predicate, object).await?;
        }
        let kind = self.classify_edge(predicate, tenant).await?;

        if for_deletion {
            if self.edge_present(subject, predicate, object, kind).await? {
                return Ok(kind);
            }
            return Err(Error::NotFound(format!(
                "Edge <{}> <{}> <{}> does not exist",
                subject, predicate, object
            )));
        }

        self.check_new_edge(subject, predicate, object, kind, None)
            .await?;
        Ok(kind)
    }

    async fn check_new_edge(
        &self,
        subject: &Uri,
        predicate: &Uri,
        object: &Uri,
        kind: RelationKind,
        overlay: Option<&Resource>,
    ) -> Result<()> {
        debug!(
            subsystem = "engine",
            component = "relations",
            resource_uri = %subject,
            predicate = %predicate,
            object_uri = %object,
            "Checking new edge"
        );

        if self
            .store
            .contains(&Triple::new(subject.clone(), predicate.clone(), object.clone()))
            .await?
        {
            return Err(Error::Conflict(format!(
                "Edge <{}> <{}> <{}> already exists",
                subject, predicate, object
            )));
        }
        if kind.is_reverse_duplicate()
            && self
                .store
                .contains(&Triple::new(object.clone(), predicate.clone(), subject.clone()))
                .await?
        {
            return Err(Error::Conflict(format!(
                "Edge <{}> <{}> <{}> already exists in the opposite direction",
                subject, predicate, object
            )));
        }

        if self
            .would_create_cycle(subject, predicate, object, kind, overlay)
            .await?
        {
            return Err(Error::Conflict(format!(
                "Edge <{}> <{}> <{}> would create a cycle",
                subject, predicate, object
            )));
        }
        Ok(())
    }

    /// The object must be a stored concept that is not soft-deleted.
    async fn require_target(&self, predicate: &Uri, object: &Uri) -> Result<()> {
        if !self
            .store
            .has_type(object, &ResourceType::Concept.type_uri())
            .await?
        {
            return Err(Error::Reference(format!(
                "Target <{}> of <{}> is not an existing concept",
                object, predicate
            )));
        }
        let deleted = Triple::new(
            object.clone(),
            openskos::status(),
            ConceptStatus::Deleted.to_term(),
        );
        if self.store.contains(&deleted).await? {
            return Err(Error::Reference(format!(
                "Target <{}> of <{}> has been deleted",
                object, predicate
            )));
        }
        Ok(())
    }

    async fn edge_present(
        &self,
        subject: &Uri,
        predicate: &Uri,
        object: &Uri,
        kind: RelationKind,
    ) -> Result<bool> {
        if self
            .store
            .contains(&Triple::new(subject.clone(), predicate.clone(), object.clone()))
            .await?
        {
            return Ok(true);
        }
        if kind.is_symmetric() {
            return self
                .store
                .contains(&Triple::new(object.clone(), predicate.clone(), subject.clone()))
                .await;
        }
        Ok(false)
    }

    /// Whether adding the edge closes a directed cycle.
    ///
    /// In parent terms the new edge runs child to parent; it closes a cycle
    /// when the child is already an ancestor of the parent.
    pub async fn would_create_cycle(
        &self,
        subject: &Uri,
        predicate: &Uri,
        object: &Uri,
        kind: RelationKind,
        overlay: Option<&Resource>,
    ) -> Result<bool> {
        let Some(walk) = Walk::for_edge(predicate, kind) else {
            return Ok(false);
        };
        let (child, parent) = match kind {
            RelationKind::Hierarchical { upward: false } => (object, subject),
            _ => (subject, object),
        };

        let mut visited: HashSet<Uri> = HashSet::from([parent.clone()]);
        let mut queue: VecDeque<Uri> = VecDeque::from([parent.clone()]);
        while let Some(node) = queue.pop_front() {
            if &node == child {
                debug!(
                    subsystem = "engine",
                    component = "relations",
                    resource_uri = %subject,
                    predicate = %predicate,
                    object_uri = %object,
                    visited = visited.len(),
                    "Cycle found"
                );
                return Ok(true);
            }
            if visited.len() > self.max_traversal_nodes {
                return Err(Error::Conflict(format!(
                    "Relation graph above <{}> exceeds {} nodes; cannot verify acyclicity",
                    parent, self.max_traversal_nodes
                )));
            }
            for next in self.parents_of(&node, &walk, overlay).await? {
                if visited.insert(next.clone()) {
                    trace!(
                        subsystem = "engine",
                        component = "relations",
                        resource_uri = %node,
                        object_uri = %next,
                        "Visiting parent"
                    );
                    queue.push_back(next);
                }
            }
        }
        trace!(
            subsystem = "engine",
            component = "relations",
            resource_uri = %subject,
            visited = visited.len(),
            "No cycle"
        );
        Ok(false)
    }

    /// Parents of a node under the walk, with the overlay's edges replacing
    /// whatever the store holds for the overlay subject.
    async fn parents_of(
        &self,
        node: &Uri,
        walk: &Walk,
        overlay: Option<&Resource>,
    ) -> Result<Vec<Uri>> {
        let overlay_uri = overlay.and_then(|r| r.uri.as_ref());
        let mut parents = Vec::new();

        match overlay {
            Some(concept) if overlay_uri == Some(node) => {
                for p in &walk.forward {
                    parents.extend(concept.uris(p).cloned());
                }
            }
            _ => {
                let outgoing = self
                    .store
                    .find_triples(&TriplePattern::any().subject(node.clone()), None)
                    .await?;
                parents.extend(
                    outgoing
                        .into_iter()
                        .filter(|t| walk.forward.contains(&t.predicate))
                        .filter_map(|t| t.object.as_uri().cloned()),
                );
            }
        }

        if walk.backward.is_empty() {
            return Ok(parents);
        }
        let incoming = self
            .store
            .find_triples(&TriplePattern::any().object(Term::uri(node.clone())), None)
            .await?;
        parents.extend(
            incoming
                .into_iter()
                .filter(|t| walk.backward.contains(&t.predicate))
                .filter(|t| Some(&t.subject) != overlay_uri)
                .map(|t| t.subject),
        );
        if let (Some(concept), Some(uri)) = (overlay, overlay_uri) {
            if walk.backward.iter().any(|p| concept.uris(p).any(|u| u == node)) {
                parents.push(uri.clone());
            }
        }
        Ok(parents)
    }
}

fn self_loop(subject: &Uri, predicate: &Uri) -> Error {
    Error::Conflict(format!(
        "Edge <{}> <{}> points at itself",
        subject, predicate
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use openvocab_core::namespaces::{openskos, owl, rdf};
    use openvocab_core::{Literal, MemoryTripleStore};

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    fn c(name: &str) -> Uri {
        uri(&format!("http://example.com/c/{}", name))
    }

    fn tenant() -> TenantContext {
        TenantContext::new("acme", uri("http://example.com/tenant/acme"))
    }

    async fn setup(concepts: &[&str], edges: &[(&str, Uri, &str)]) -> (MemoryTripleStore, RelationIntegrityChecker) {
        let store = MemoryTripleStore::new();
        for name in concepts {
            store
                .insert_triples(&[Triple::new(c(name), rdf::type_(), skos::concept())])
                .await
                .unwrap();
        }
        for (s, p, o) in edges {
            store
                .insert_triples(&[Triple::new(c(s), p.clone(), c(o))])
                .await
                .unwrap();
        }
        let shared: Arc<dyn TripleStore> = Arc::new(store.clone());
        let checker = RelationIntegrityChecker::new(
            shared.clone(),
            RelationRegistry::new(shared, vec!["http://example.com/rel#".to_string()]),
            Arc::new(ResourceTypeRegistry::standard()),
            1_000,
        );
        (store, checker)
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&skos::broader()),
            Some(RelationKind::Hierarchical { upward: true })
        );
        assert_eq!(
            classify(&skos::narrower_transitive()),
            Some(RelationKind::Hierarchical { upward: false })
        );
        assert_eq!(classify(&skos::exact_match()), Some(RelationKind::Symmetric));
        assert_eq!(classify(&skos::broad_match()), Some(RelationKind::Match));
        assert_eq!(
            classify(&skos::semantic_relation()),
            Some(RelationKind::Mapping)
        );
        assert_eq!(classify(&skos::pref_label()), None);
        for p in skos::concept_relations() {
            assert!(classify(&p).is_some(), "{} should classify", p);
        }
    }

    #[tokio::test]
    async fn test_chain_rejects_closing_edge() {
        let broader = skos::broader();
        let (_, checker) = setup(
            &["a", "b", "c", "d"],
            &[("a", broader.clone(), "b"), ("b", broader.clone(), "c")],
        )
        .await;

        let err = checker
            .check_single_edge(&c("c"), &broader, &c("a"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m.contains("cycle")));

        checker
            .check_single_edge(&c("c"), &broader, &c("d"), false, &tenant())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cycle_search_uses_inverse_closure() {
        // b narrower a makes b a parent of a.
        let (_, checker) = setup(&["a", "b"], &[("b", skos::narrower(), "a")]).await;

        let err = checker
            .check_single_edge(&c("b"), &skos::broader_transitive(), &c("a"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let err = checker
            .check_single_edge(&c("a"), &skos::narrower(), &c("b"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_symmetric_duplicates_both_directions_without_cycle_check() {
        let related = skos::related();
        let (_, checker) = setup(&["a", "b", "x"], &[("a", related.clone(), "b")]).await;

        let err = checker
            .check_single_edge(&c("b"), &related, &c("a"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m.contains("opposite")));

        // Symmetric predicates impose no hierarchy.
        checker
            .check_single_edge(&c("b"), &related, &c("x"), false, &tenant())
            .await
            .unwrap();

        // Removal finds the edge from either end.
        checker
            .check_single_edge(&c("b"), &related, &c("a"), true, &tenant())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_match_reverse_is_duplicate_but_removal_is_directed() {
        let broad_match = skos::broad_match();
        let (_, checker) = setup(&["a", "b"], &[("a", broad_match.clone(), "b")]).await;

        let err = checker
            .check_single_edge(&c("b"), &broad_match, &c("a"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m.contains("opposite")));

        let err = checker
            .check_single_edge(&c("b"), &broad_match, &c("a"), true, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_target_precedes_predicate() {
        let (_, checker) = setup(&["a"], &[]).await;
        let unknown = uri("http://elsewhere.org/ns#likes");
        let err = checker
            .check_single_edge(&c("a"), &unknown, &c("ghost"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Reference(_)), "{:?}", err);

        let mut concept = Resource::new(c("a"), skos::concept());
        concept.add_property(unknown, c("ghost"));
        let err = checker
            .check_concept_relations(&concept, None, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Reference(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_self_loop_precedes_existence() {
        let (_, checker) = setup(&[], &[]).await;
        let err = checker
            .check_single_edge(&c("ghost"), &skos::related(), &c("ghost"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_target_must_be_live_concept() {
        let (store, checker) = setup(&["a", "gone"], &[]).await;
        store
            .insert_triples(&[Triple::new(
                c("gone"),
                openskos::status(),
                ConceptStatus::Deleted.to_term(),
            )])
            .await
            .unwrap();

        for target in ["missing", "gone"] {
            let err = checker
                .check_single_edge(&c("a"), &skos::broader(), &c(target), false, &tenant())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Reference(_)), "{}: {:?}", target, err);
        }
    }

    #[tokio::test]
    async fn test_missing_edge_removal_is_not_found() {
        let (_, checker) = setup(&["a", "b"], &[]).await;
        let err = checker
            .check_single_edge(&c("a"), &skos::broader(), &c("b"), true, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_custom_relations() {
        let part_of = uri("http://example.com/rel#partOf");
        let (store, checker) = setup(&["a", "b"], &[("a", part_of.clone(), "b")]).await;

        let err = checker
            .check_single_edge(&c("b"), &part_of, &c("a"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRelation(ref m) if m.contains("not registered")));

        store
            .insert_triples(&[
                Triple::new(part_of.clone(), rdf::type_(), owl::object_property()),
                Triple::new(part_of.clone(), openskos::tenant(), tenant().uri),
            ])
            .await
            .unwrap();
        let err = checker
            .check_single_edge(&c("b"), &part_of, &c("a"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m.contains("cycle")));

        let unknown = uri("http://elsewhere.org/ns#likes");
        let err = checker
            .check_single_edge(&c("a"), &unknown, &c("b"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRelation(_)));
    }

    #[tokio::test]
    async fn test_concept_overlay_replaces_stored_edges() {
        let broader = skos::broader();
        // Stored: a broader b. The update moves a under c and puts b under a.
        let (store, checker) = setup(&["a", "b", "c"], &[("a", broader.clone(), "b")]).await;
        let stored = store.fetch_resource(&c("a")).await.unwrap().unwrap();

        let mut moved = Resource::new(c("a"), skos::concept());
        moved.add_property(skos::pref_label(), Literal::lang("A", "en"));
        moved.add_property(broader.clone(), c("c"));
        moved.add_property(skos::narrower(), c("b"));
        checker
            .check_concept_relations(&moved, Some(&stored), &tenant())
            .await
            .unwrap();

        // Keeping the stored edge while adding its inverse closes a cycle.
        let mut looped = stored.clone();
        looped.add_property(skos::narrower(), c("b"));
        let err = checker
            .check_concept_relations(&looped, Some(&stored), &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m.contains("cycle")));
    }

    #[tokio::test]
    async fn test_concept_literal_relation_value_rejected() {
        let (_, checker) = setup(&["b"], &[]).await;
        let mut concept = Resource::new(c("a"), skos::concept());
        concept.add_property(skos::broader(), Literal::plain("b"));
        let err = checker
            .check_concept_relations(&concept, None, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_concept_unknown_predicate_is_invalid_relation() {
        let (_, checker) = setup(&["b"], &[]).await;
        let mut concept = Resource::new(c("a"), skos::concept());
        concept.add_property(uri("http://elsewhere.org/ns#likes"), c("b"));
        let err = checker
            .check_concept_relations(&concept, None, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRelation(_)));
    }

    #[tokio::test]
    async fn test_traversal_budget() {
        let broader = skos::broader();
        let names: Vec<String> = (0..10).map(|i| format!("n{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let edges: Vec<(&str, Uri, &str)> = refs
            .windows(2)
            .map(|w| (w[0], broader.clone(), w[1]))
            .collect();
        let (store, _) = setup(&refs, &edges).await;
        store
            .insert_triples(&[Triple::new(c("x"), rdf::type_(), skos::concept())])
            .await
            .unwrap();

        let shared: Arc<dyn TripleStore> = Arc::new(store);
        let tight = RelationIntegrityChecker::new(
            shared.clone(),
            RelationRegistry::new(shared, vec![]),
            Arc::new(ResourceTypeRegistry::standard()),
            3,
        );
        let err = tight
            .check_single_edge(&c("x"), &broader, &c("n0"), false, &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m.contains("acyclicity")));
    }
}
