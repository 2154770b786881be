//! Resource types and the per-type rule table.
//!
//! Type dispatch is a closed enum resolved through [`ResourceTypeRegistry`],
//! built once at startup. Handlers never branch on raw type URIs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::namespaces::{dcmitype, dcterms, foaf, openskos, org, owl, rdf, rdfs, skos, vcard};
use crate::rdf::{Resource, Uri};

/// Known resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Concept,
    ConceptScheme,
    SkosCollection,
    Set,
    Tenant,
    Person,
    RelationDefinition,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Concept,
        ResourceType::ConceptScheme,
        ResourceType::SkosCollection,
        ResourceType::Set,
        ResourceType::Tenant,
        ResourceType::Person,
        ResourceType::RelationDefinition,
    ];

    /// The `rdf:type` URI of this resource type.
    pub fn type_uri(&self) -> Uri {
        match self {
            ResourceType::Concept => skos::concept(),
            ResourceType::ConceptScheme => skos::concept_scheme(),
            ResourceType::SkosCollection => skos::collection(),
            ResourceType::Set => dcmitype::dataset(),
            ResourceType::Tenant => org::formal_organization(),
            ResourceType::Person => foaf::person(),
            ResourceType::RelationDefinition => owl::object_property(),
        }
    }

    /// Reverse of [`ResourceType::type_uri`].
    pub fn from_type_uri(uri: &Uri) -> Option<Self> {
        Self::ALL.into_iter().find(|t| &t.type_uri() == uri)
    }

    /// Type of a resource, from its single declared `rdf:type`.
    pub fn of(resource: &Resource) -> Result<Self> {
        let type_uri = resource.resource_type_uri().ok_or_else(|| {
            Error::InvalidInput("Resource must declare exactly one rdf:type".to_string())
        })?;
        Self::from_type_uri(type_uri).ok_or_else(|| {
            Error::InvalidInput(format!("Unsupported resource type: {}", type_uri))
        })
    }

    pub fn is_concept(&self) -> bool {
        matches!(self, ResourceType::Concept)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Concept => write!(f, "concept"),
            Self::ConceptScheme => write!(f, "concept_scheme"),
            Self::SkosCollection => write!(f, "skos_collection"),
            Self::Set => write!(f, "set"),
            Self::Tenant => write!(f, "tenant"),
            Self::Person => write!(f, "person"),
            Self::RelationDefinition => write!(f, "relation_definition"),
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "concept" => Ok(Self::Concept),
            "concept_scheme" | "conceptscheme" | "scheme" => Ok(Self::ConceptScheme),
            "skos_collection" | "collection" => Ok(Self::SkosCollection),
            "set" => Ok(Self::Set),
            "tenant" | "institution" => Ok(Self::Tenant),
            "person" | "user" => Ok(Self::Person),
            "relation_definition" | "relation" => Ok(Self::RelationDefinition),
            _ => Err(Error::InvalidInput(format!("Unknown resource type: {}", s))),
        }
    }
}

/// How a resource leaves the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// Stamp status `deleted`, keep triples.
    Soft,
    /// Remove every triple with the resource as subject.
    Hard,
}

/// Rules for one resource type.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub kind: ResourceType,
    pub deletion_policy: DeletionPolicy,
    /// Namespaces a predicate may come from.
    pub allowed_namespaces: Vec<&'static str>,
    /// Predicates that must carry at least one value.
    pub required_properties: Vec<Uri>,
    /// Predicates that may not change once stored.
    pub immutable_properties: Vec<Uri>,
    /// Only administrators (or root) may create this type.
    pub admin_only_create: bool,
}

impl TypeSpec {
    pub fn allows_predicate(&self, predicate: &Uri) -> bool {
        self.allowed_namespaces
            .iter()
            .any(|ns| predicate.in_namespace(ns))
    }
}

/// Lookup table from type URI to [`TypeSpec`].
#[derive(Debug, Clone)]
pub struct ResourceTypeRegistry {
    specs: HashMap<ResourceType, TypeSpec>,
}

/// Predicates every persisted resource may not alter.
fn server_stamped() -> Vec<Uri> {
    vec![
        openskos::uuid(),
        dcterms::creator(),
        dcterms::date_submitted(),
        openskos::tenant(),
    ]
}

impl ResourceTypeRegistry {
    /// The standard table.
    pub fn standard() -> Self {
        let base = [rdf::NAMESPACE, rdfs::NAMESPACE, dcterms::NAMESPACE, openskos::NAMESPACE];
        let with = |extra: &[&'static str]| -> Vec<&'static str> {
            base.iter().chain(extra.iter()).copied().collect()
        };

        let specs = [
            TypeSpec {
                kind: ResourceType::Concept,
                deletion_policy: DeletionPolicy::Soft,
                allowed_namespaces: with(&[skos::NAMESPACE]),
                required_properties: vec![skos::pref_label()],
                immutable_properties: server_stamped(),
                admin_only_create: false,
            },
            TypeSpec {
                kind: ResourceType::ConceptScheme,
                deletion_policy: DeletionPolicy::Hard,
                allowed_namespaces: with(&[skos::NAMESPACE]),
                required_properties: vec![dcterms::title()],
                immutable_properties: server_stamped(),
                admin_only_create: false,
            },
            TypeSpec {
                kind: ResourceType::SkosCollection,
                deletion_policy: DeletionPolicy::Hard,
                allowed_namespaces: with(&[skos::NAMESPACE]),
                required_properties: vec![],
                immutable_properties: server_stamped(),
                admin_only_create: false,
            },
            TypeSpec {
                kind: ResourceType::Set,
                deletion_policy: DeletionPolicy::Hard,
                allowed_namespaces: with(&[]),
                required_properties: vec![openskos::code(), dcterms::publisher()],
                immutable_properties: vec![openskos::uuid(), openskos::code()],
                admin_only_create: true,
            },
            TypeSpec {
                kind: ResourceType::Tenant,
                deletion_policy: DeletionPolicy::Hard,
                allowed_namespaces: with(&[org::NAMESPACE, vcard::NAMESPACE, foaf::NAMESPACE]),
                required_properties: vec![openskos::code()],
                immutable_properties: vec![openskos::uuid(), openskos::code()],
                admin_only_create: true,
            },
            TypeSpec {
                kind: ResourceType::Person,
                deletion_policy: DeletionPolicy::Hard,
                allowed_namespaces: with(&[foaf::NAMESPACE]),
                required_properties: vec![foaf::name()],
                immutable_properties: vec![openskos::uuid(), openskos::tenant()],
                admin_only_create: true,
            },
            TypeSpec {
                kind: ResourceType::RelationDefinition,
                deletion_policy: DeletionPolicy::Hard,
                allowed_namespaces: with(&[owl::NAMESPACE]),
                required_properties: vec![rdfs::label()],
                immutable_properties: server_stamped(),
                admin_only_create: true,
            },
        ];

        Self {
            specs: specs.into_iter().map(|s| (s.kind, s)).collect(),
        }
    }

    /// Spec for a type. Every variant is registered by [`Self::standard`].
    pub fn spec(&self, kind: ResourceType) -> Result<&TypeSpec> {
        self.specs
            .get(&kind)
            .ok_or_else(|| Error::Internal(format!("No type spec registered for {}", kind)))
    }

    /// Resolve the spec for a resource's declared type.
    pub fn spec_for(&self, resource: &Resource) -> Result<&TypeSpec> {
        self.spec(ResourceType::of(resource)?)
    }
}

impl Default for ResourceTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
