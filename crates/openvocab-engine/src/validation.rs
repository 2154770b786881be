//! Structural validation of stamped resources.
//!
//! Validation failures are collected, not raised: [`ResourceValidator::validate`]
//! returns every message in a fixed order and the caller decides what to do
//! with a non-empty list. Errors are only returned when the store fails.
//!
//! Relation edges on concepts, and concept predicates outside the concept
//! namespaces, are left to [`crate::relations`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use openvocab_core::namespaces::{dcterms, foaf, openskos, rdf, rdfs, skos};
use openvocab_core::{
    ConceptStatus, Literal, NamespaceRegistry, Resource, ResourceType, ResourceTypeRegistry,
    Result, TenantContext, Term, Triple, TripleStore, TypeSpec, Uri,
};

/// What the resource is being validated for.
#[derive(Debug, Clone, Copy)]
pub enum ValidationMode<'a> {
    Create,
    /// Replacing the given stored version.
    Update { stored: &'a Resource },
}

impl ValidationMode<'_> {
    pub fn is_for_update(&self) -> bool {
        matches!(self, ValidationMode::Update { .. })
    }
}

/// Predicates whose values must be URIs.
fn uri_valued() -> Vec<Uri> {
    vec![
        rdf::type_(),
        openskos::tenant(),
        openskos::set(),
        openskos::modified_by(),
        openskos::deleted_by(),
        openskos::accepted_by(),
        dcterms::creator(),
        dcterms::contributor(),
        dcterms::publisher(),
        skos::in_scheme(),
        skos::top_concept_of(),
        skos::has_top_concept(),
        skos::member(),
    ]
}

/// Predicates whose values must be literals.
fn literal_valued() -> Vec<Uri> {
    let mut predicates = vec![
        openskos::uuid(),
        openskos::code(),
        openskos::status(),
        dcterms::title(),
        dcterms::description(),
        rdfs::label(),
        rdfs::comment(),
        foaf::name(),
        skos::notation(),
    ];
    predicates.extend(skos::label_properties());
    predicates.extend(skos::documentation_properties());
    predicates
}

/// Predicates that take at most one value.
fn single_valued() -> Vec<Uri> {
    vec![
        openskos::uuid(),
        openskos::code(),
        openskos::status(),
        openskos::tenant(),
        dcterms::date_submitted(),
        dcterms::modified(),
    ]
}

fn language_of(term: &Term) -> &str {
    term.as_literal()
        .and_then(|l| l.language.as_deref())
        .unwrap_or("")
}

fn short(predicate: &Uri) -> String {
    format!("<{}>", predicate)
}

#[derive(Clone)]
pub struct ResourceValidator {
    store: Arc<dyn TripleStore>,
    types: Arc<ResourceTypeRegistry>,
    namespaces: Arc<dyn NamespaceRegistry>,
}

impl ResourceValidator {
    pub fn new(
        store: Arc<dyn TripleStore>,
        types: Arc<ResourceTypeRegistry>,
        namespaces: Arc<dyn NamespaceRegistry>,
    ) -> Self {
        Self {
            store,
            types,
            namespaces,
        }
    }

    /// Validate a stamped resource. An empty list means valid.
    pub async fn validate(
        &self,
        resource: &Resource,
        mode: ValidationMode<'_>,
        tenant: &TenantContext,
    ) -> Result<Vec<String>> {
        let mut errors = Vec::new();

        let spec = match ResourceType::of(resource).and_then(|kind| self.types.spec(kind)) {
            Ok(spec) => spec,
            Err(e) => {
                errors.push(e.to_string());
                return Ok(errors);
            }
        };

        self.check_namespaces(resource, spec, &mut errors);
        check_required(resource, spec, &mut errors);
        check_value_shapes(resource, &mut errors);

        match spec.kind {
            ResourceType::Concept => {
                check_labels(resource, &mut errors);
                check_concept_status(resource, &mut errors);
                self.check_unique_pref_labels(resource, &mut errors).await?;
            }
            ResourceType::Tenant | ResourceType::Set => {
                self.check_unique_code(resource, spec.kind, &mut errors)
                    .await?;
            }
            _ => {}
        }

        if let ValidationMode::Update { stored } = mode {
            check_unchanged(resource, stored, spec, &mut errors);
        }

        debug!(
            subsystem = "engine",
            component = "validation",
            resource_uri = ?resource.uri.as_ref().map(|u| u.as_str()),
            resource_type = %spec.kind,
            tenant = %tenant.code,
            for_update = mode.is_for_update(),
            result_count = errors.len(),
            "Validated resource"
        );
        Ok(errors)
    }

    fn check_namespaces(&self, resource: &Resource, spec: &TypeSpec, errors: &mut Vec<String>) {
        for predicate in resource.predicates() {
            if spec.allows_predicate(predicate) {
                continue;
            }
            if spec.kind.is_concept() {
                continue;
            }
            if self.namespaces.is_standard_property(predicate) {
                errors.push(format!(
                    "Property {} is not allowed on a {}",
                    short(predicate),
                    spec.kind
                ));
            } else {
                errors.push(format!(
                    "Property {} is not from a recognised vocabulary",
                    short(predicate)
                ));
            }
        }
    }

    /// A preferred label is unique within each scheme the concept belongs to.
    async fn check_unique_pref_labels(
        &self,
        resource: &Resource,
        errors: &mut Vec<String>,
    ) -> Result<()> {
        let schemes: Vec<&Uri> = resource.uris(&skos::in_scheme()).collect();
        if schemes.is_empty() {
            return Ok(());
        }
        for label in resource.property(&skos::pref_label()) {
            if label.as_literal().is_none() {
                continue;
            }
            for other in self.store.subjects_with(&skos::pref_label(), label).await? {
                if resource.uri.as_ref() == Some(&other) {
                    continue;
                }
                let deleted = Triple::new(
                    other.clone(),
                    openskos::status(),
                    ConceptStatus::Deleted.to_term(),
                );
                if self.store.contains(&deleted).await? {
                    continue;
                }
                for scheme in &schemes {
                    let shared = Triple::new(other.clone(), skos::in_scheme(), (*scheme).clone());
                    if self.store.contains(&shared).await? {
                        errors.push(format!(
                            "Preferred label '{}' is already used by <{}> in scheme <{}>",
                            label.lexical(),
                            other,
                            scheme
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Tenant codes are unique; set codes are unique per publisher.
    async fn check_unique_code(
        &self,
        resource: &Resource,
        kind: ResourceType,
        errors: &mut Vec<String>,
    ) -> Result<()> {
        let Some(code) = resource.first(&openskos::code()) else {
            return Ok(());
        };
        let code_term = Term::Literal(Literal::plain(code.lexical()));
        for other in self.store.subjects_with(&openskos::code(), &code_term).await? {
            if resource.uri.as_ref() == Some(&other) {
                continue;
            }
            if !self.store.has_type(&other, &kind.type_uri()).await? {
                continue;
            }
            if kind == ResourceType::Set {
                let mut same_publisher = false;
                for publisher in resource.uris(&dcterms::publisher()) {
                    let t = Triple::new(other.clone(), dcterms::publisher(), publisher.clone());
                    if self.store.contains(&t).await? {
                        same_publisher = true;
                        break;
                    }
                }
                if !same_publisher {
                    continue;
                }
            }
            errors.push(format!(
                "Code '{}' is already used by {} <{}>",
                code.lexical(),
                kind,
                other
            ));
        }
        Ok(())
    }
}

fn check_required(resource: &Resource, spec: &TypeSpec, errors: &mut Vec<String>) {
    for predicate in &spec.required_properties {
        if !resource.has_property(predicate) {
            errors.push(format!(
                "Property {} is required on a {}",
                short(predicate),
                spec.kind
            ));
        }
    }
}

fn check_value_shapes(resource: &Resource, errors: &mut Vec<String>) {
    for predicate in uri_valued() {
        if let Some(bad) = resource
            .property(&predicate)
            .iter()
            .find(|t| t.as_uri().is_none())
        {
            errors.push(format!(
                "Property {} must be a URI, got literal '{}'",
                short(&predicate),
                bad.lexical()
            ));
        }
    }
    for predicate in literal_valued() {
        if let Some(bad) = resource
            .property(&predicate)
            .iter()
            .find(|t| t.as_literal().is_none())
        {
            errors.push(format!(
                "Property {} must be a literal, got <{}>",
                short(&predicate),
                bad.lexical()
            ));
        }
    }
    for predicate in single_valued() {
        let count = resource.property(&predicate).len();
        if count > 1 {
            errors.push(format!(
                "Property {} takes one value, got {}",
                short(&predicate),
                count
            ));
        }
    }
}

/// One preferred label per language; pref, alt and hidden labels disjoint.
fn check_labels(resource: &Resource, errors: &mut Vec<String>) {
    let mut per_language: HashMap<&str, usize> = HashMap::new();
    for label in resource.property(&skos::pref_label()) {
        *per_language.entry(language_of(label)).or_default() += 1;
    }
    let mut duplicated: Vec<_> = per_language.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicated.sort();
    for (language, count) in duplicated {
        let language = if language.is_empty() { "no language" } else { language };
        errors.push(format!(
            "A concept has at most one preferred label per language; found {} for {}",
            count, language
        ));
    }

    let [pref, alt, hidden] = skos::label_properties();
    for (a, b) in [(&pref, &alt), (&pref, &hidden), (&alt, &hidden)] {
        let left: BTreeSet<&Term> = resource.property(a).iter().collect();
        for label in resource.property(b) {
            if left.contains(label) {
                errors.push(format!(
                    "Label '{}' is used as both {} and {}",
                    label.lexical(),
                    short(a),
                    short(b)
                ));
            }
        }
    }
}

fn check_concept_status(resource: &Resource, errors: &mut Vec<String>) {
    match ConceptStatus::of(resource) {
        Ok(Some(ConceptStatus::Deleted)) => {
            errors.push("Status 'deleted' can only be set by deleting the concept".to_string())
        }
        Ok(_) => {}
        Err(e) => errors.push(e.to_string()),
    }
}

fn check_unchanged(resource: &Resource, stored: &Resource, spec: &TypeSpec, errors: &mut Vec<String>) {
    if resource.uri != stored.uri {
        errors.push(format!(
            "Resource URI cannot change (stored <{}>)",
            stored
                .uri
                .as_ref()
                .map(|u| u.as_str())
                .unwrap_or_default()
        ));
    }
    if resource.resource_type_uri() != stored.resource_type_uri() {
        errors.push("Resource type cannot change".to_string());
    }
    for predicate in &spec.immutable_properties {
        if !stored.has_property(predicate) {
            continue;
        }
        let before: BTreeSet<&Term> = stored.property(predicate).iter().collect();
        let after: BTreeSet<&Term> = resource.property(predicate).iter().collect();
        if before != after {
            errors.push(format!("Property {} cannot be changed", short(predicate)));
        }
    }
}
