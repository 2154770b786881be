//! Concept lifecycle status.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rdf::{Literal, Resource, Term};
use crate::namespaces::openskos;

/// Editorial status of a concept, stored as `openskos:status`.
///
/// `Deleted` is a soft marker; the concept's triples stay in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptStatus {
    Candidate,
    Approved,
    Redirected,
    NotCompliant,
    Rejected,
    Obsolete,
    Deleted,
}

impl ConceptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Approved => "approved",
            Self::Redirected => "redirected",
            Self::NotCompliant => "not_compliant",
            Self::Rejected => "rejected",
            Self::Obsolete => "obsolete",
            Self::Deleted => "deleted",
        }
    }

    /// Literal form stored in the graph.
    pub fn to_term(&self) -> Term {
        Term::Literal(Literal::plain(self.as_str()))
    }

    /// Status recorded on a resource, if any.
    ///
    /// An unparseable value is an error so callers cannot mistake it for "no status".
    pub fn of(resource: &Resource) -> Result<Option<Self>> {
        resource
            .first(&openskos::status())
            .map(|term| term.lexical().parse())
            .transpose()
    }

    /// Whether the resource carries the soft-delete marker.
    pub fn is_deleted(resource: &Resource) -> bool {
        matches!(Self::of(resource), Ok(Some(ConceptStatus::Deleted)))
    }
}

impl std::fmt::Display for ConceptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConceptStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "candidate" => Ok(Self::Candidate),
            "approved" => Ok(Self::Approved),
            "redirected" => Ok(Self::Redirected),
            "not_compliant" | "notcompliant" => Ok(Self::NotCompliant),
            "rejected" => Ok(Self::Rejected),
            "obsolete" => Ok(Self::Obsolete),
            "deleted" => Ok(Self::Deleted),
            _ => Err(Error::InvalidInput(format!("Unknown concept status: {}", s))),
        }
    }
}
