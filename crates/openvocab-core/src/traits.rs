//! Collaborator traits consumed by the mutation pipeline.
//!
//! Concrete stores live in `openvocab-db` (PostgreSQL), `openvocab-sparql`
//! (SPARQL 1.1 endpoint) and [`crate::memory`] (in-process).

use async_trait::async_trait;

use crate::error::Result;
use crate::namespaces::rdf;
use crate::rdf::{Resource, Term, Triple, Uri};
use crate::user::User;

// =============================================================================
// TRIPLE STORE
// =============================================================================

/// Triple pattern; `None` positions match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Uri>,
    pub predicate: Option<Uri>,
    pub object: Option<Term>,
}

impl TriplePattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: Uri) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn predicate(mut self, predicate: Uri) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Pattern matching exactly one triple.
    pub fn exact(triple: &Triple) -> Self {
        Self {
            subject: Some(triple.subject.clone()),
            predicate: Some(triple.predicate.clone()),
            object: Some(triple.object.clone()),
        }
    }

    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| s == &triple.subject)
            && self.predicate.as_ref().map_or(true, |p| p == &triple.predicate)
            && self.object.as_ref().map_or(true, |o| o == &triple.object)
    }
}

/// Graph store holding every resource as triples.
///
/// Each call is one round trip. There is no transaction spanning calls.
#[async_trait]
pub trait TripleStore: Send + Sync {
    /// Triples matching a pattern, at most `limit` when given.
    async fn find_triples(&self, pattern: &TriplePattern, limit: Option<usize>)
        -> Result<Vec<Triple>>;

    /// Whether any triple matches the pattern.
    async fn ask(&self, pattern: &TriplePattern) -> Result<bool>;

    /// Insert triples. Inserting an existing triple is a no-op.
    async fn insert_triples(&self, triples: &[Triple]) -> Result<()>;

    /// Delete triples. Deleting an absent triple is a no-op.
    async fn delete_triples(&self, triples: &[Triple]) -> Result<()>;

    /// Remove every triple with the given subject.
    async fn delete_subject(&self, subject: &Uri) -> Result<()>;

    /// Replace the triples of a subject in a single write.
    async fn replace_subject(&self, subject: &Uri, triples: &[Triple]) -> Result<()>;

    /// Load a resource by URI, `None` when no triple has it as subject.
    async fn fetch_resource(&self, uri: &Uri) -> Result<Option<Resource>> {
        let triples = self
            .find_triples(&TriplePattern::any().subject(uri.clone()), None)
            .await?;
        if triples.is_empty() {
            return Ok(None);
        }
        Ok(Some(Resource::from_triples(uri.clone(), triples)))
    }

    /// Whether the exact triple is stored.
    async fn contains(&self, triple: &Triple) -> Result<bool> {
        self.ask(&TriplePattern::exact(triple)).await
    }

    /// Whether the URI is the subject of a triple declaring the given type.
    async fn has_type(&self, uri: &Uri, type_uri: &Uri) -> Result<bool> {
        self.ask(
            &TriplePattern::any()
                .subject(uri.clone())
                .predicate(rdf::type_())
                .object(type_uri.clone()),
        )
        .await
    }

    /// URI objects of `(subject, predicate, ?)`.
    async fn objects_of(&self, subject: &Uri, predicate: &Uri) -> Result<Vec<Uri>> {
        let triples = self
            .find_triples(
                &TriplePattern::any()
                    .subject(subject.clone())
                    .predicate(predicate.clone()),
                None,
            )
            .await?;
        Ok(triples
            .into_iter()
            .filter_map(|t| t.object.as_uri().cloned())
            .collect())
    }

    /// Subjects of `(?, predicate, object)`.
    async fn subjects_with(&self, predicate: &Uri, object: &Term) -> Result<Vec<Uri>> {
        let triples = self
            .find_triples(
                &TriplePattern::any()
                    .predicate(predicate.clone())
                    .object(object.clone()),
                None,
            )
            .await?;
        Ok(triples.into_iter().map(|t| t.subject).collect())
    }
}

// =============================================================================
// LOOKUP COLLABORATORS
// =============================================================================

/// Maps tenant codes to tenant URIs.
#[async_trait]
pub trait TenantResolver: Send + Sync {
    async fn code_to_uri(&self, code: &str) -> Result<Option<Uri>>;
}

/// API-key user lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn by_api_key(&self, api_key: &str) -> Result<Option<User>>;
}

/// Prefix registry and standard-property knowledge.
pub trait NamespaceRegistry: Send + Sync {
    /// Whether the predicate belongs to a recognised vocabulary.
    fn is_standard_property(&self, predicate: &Uri) -> bool;

    /// Expand `prefix:local` to a full URI.
    fn expand_short_name(&self, name: &str) -> Result<Uri>;
}

// =============================================================================
// DOCUMENT CODEC
// =============================================================================

/// Decodes a raw RDF document holding exactly one top-level resource.
pub trait ResourceDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> Result<Resource>;
}

/// Encodes a resource as a raw RDF document.
pub trait ResourceEncoder: Send + Sync {
    fn encode(&self, resource: &Resource) -> Result<String>;
}
