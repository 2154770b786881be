//! RDF resource model.
//!
//! A [`Resource`] is the in-memory view of every triple sharing one subject.
//! Before persistence a resource may be blank (no URI assigned yet).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::namespaces::{openskos, rdf};

// =============================================================================
// URI
// =============================================================================

/// Absolute IRI naming a resource or predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uri(String);

impl Uri {
    /// Parse and validate an absolute IRI.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if !Self::is_valid(&value) {
            return Err(Error::InvalidInput(format!("Not an absolute URI: '{}'", value)));
        }
        Ok(Self(value))
    }

    /// Build a URI from a compile-time constant known to be valid.
    pub fn from_static(value: &'static str) -> Self {
        debug_assert!(Self::is_valid(value), "invalid static URI {}", value);
        Self(value.to_string())
    }

    fn is_valid(value: &str) -> bool {
        let Some((scheme, rest)) = value.split_once(':') else {
            return false;
        };
        let scheme_ok = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        scheme_ok
            && !rest.is_empty()
            && !value.chars().any(|c| {
                c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`')
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this URI lives under the given namespace prefix.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.0.starts_with(namespace)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Uri {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Uri::parse(value)
    }
}

impl From<Uri> for String {
    fn from(uri: Uri) -> Self {
        uri.0
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uri::parse(s)
    }
}

// =============================================================================
// TERMS
// =============================================================================

/// Literal value with optional language tag or datatype.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Uri>,
}

impl Literal {
    /// Plain literal without language or datatype.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Language-tagged literal.
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into()),
            datatype: None,
        }
    }

    /// Typed literal.
    pub fn typed(value: impl Into<String>, datatype: Uri) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: Some(datatype),
        }
    }
}

/// Object position of a triple: a reference to another resource or a literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    Uri { value: Uri },
    Literal(Literal),
}

impl Term {
    pub fn uri(uri: Uri) -> Self {
        Term::Uri { value: uri }
    }

    pub fn literal(literal: Literal) -> Self {
        Term::Literal(literal)
    }

    pub fn as_uri(&self) -> Option<&Uri> {
        match self {
            Term::Uri { value } => Some(value),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Uri { .. } => None,
            Term::Literal(lit) => Some(lit),
        }
    }

    /// Lexical value regardless of term kind.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Uri { value } => value.as_str(),
            Term::Literal(lit) => &lit.value,
        }
    }
}

impl From<Uri> for Term {
    fn from(uri: Uri) -> Self {
        Term::uri(uri)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Uri { value } => write!(f, "<{}>", value),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", lit.value)?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{}", lang)?;
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{}>", dt)?;
                }
                Ok(())
            }
        }
    }
}

/// One subject-predicate-object statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Uri,
    pub predicate: Uri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Uri, predicate: Uri, object: impl Into<Term>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

// =============================================================================
// RESOURCE
// =============================================================================

/// All statements about one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// `None` while the resource is blank.
    pub uri: Option<Uri>,
    /// Predicate to ordered values.
    pub properties: BTreeMap<Uri, Vec<Term>>,
}

impl Resource {
    /// A blank resource of the given type.
    pub fn blank(type_uri: Uri) -> Self {
        let mut resource = Self::default();
        resource.set_property(rdf::type_(), vec![Term::uri(type_uri)]);
        resource
    }

    /// A resource with a URI and the given type.
    pub fn new(uri: Uri, type_uri: Uri) -> Self {
        let mut resource = Self::blank(type_uri);
        resource.uri = Some(uri);
        resource
    }

    pub fn is_blank(&self) -> bool {
        self.uri.is_none()
    }

    /// URI or an error naming the missing identifier.
    pub fn require_uri(&self) -> Result<&Uri> {
        self.uri
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("Resource has no URI (rdf:about)".to_string()))
    }

    /// The single declared `rdf:type`, if exactly one is present.
    pub fn resource_type_uri(&self) -> Option<&Uri> {
        match self.properties.get(&rdf::type_()) {
            Some(values) if values.len() == 1 => values[0].as_uri(),
            _ => None,
        }
    }

    pub fn property(&self, predicate: &Uri) -> &[Term] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_property(&self, predicate: &Uri) -> bool {
        !self.property(predicate).is_empty()
    }

    /// First value of a property.
    pub fn first(&self, predicate: &Uri) -> Option<&Term> {
        self.property(predicate).first()
    }

    /// URI-valued objects of a property, skipping literals.
    pub fn uris(&self, predicate: &Uri) -> impl Iterator<Item = &Uri> {
        self.property(predicate).iter().filter_map(Term::as_uri)
    }

    /// Append a value unless it is already present.
    pub fn add_property(&mut self, predicate: Uri, value: impl Into<Term>) {
        let value = value.into();
        let values = self.properties.entry(predicate).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Replace all values of a property.
    pub fn set_property(&mut self, predicate: Uri, values: Vec<Term>) {
        if values.is_empty() {
            self.properties.remove(&predicate);
        } else {
            self.properties.insert(predicate, values);
        }
    }

    pub fn unset_property(&mut self, predicate: &Uri) {
        self.properties.remove(predicate);
    }

    /// Predicates present on the resource.
    pub fn predicates(&self) -> impl Iterator<Item = &Uri> {
        self.properties.keys()
    }

    /// Values of `openskos:uuid`.
    pub fn uuid(&self) -> Option<&str> {
        self.first(&openskos::uuid()).map(Term::lexical)
    }

    /// Flatten into triples. Blank resources cannot be flattened.
    pub fn triples(&self) -> Result<Vec<Triple>> {
        let subject = self.require_uri()?;
        Ok(self
            .properties
            .iter()
            .flat_map(|(predicate, values)| {
                values
                    .iter()
                    .map(|value| Triple::new(subject.clone(), predicate.clone(), value.clone()))
            })
            .collect())
    }

    /// Rebuild a resource from triples sharing one subject.
    ///
    /// Triples about other subjects are ignored.
    pub fn from_triples(uri: Uri, triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut resource = Self {
            uri: Some(uri.clone()),
            properties: BTreeMap::new(),
        };
        for triple in triples.into_iter().filter(|t| t.subject == uri) {
            resource.add_property(triple.predicate, triple.object);
        }
        resource
    }
}
