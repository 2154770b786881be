//! SPARQL 1.1 Query Results JSON parsing.

use std::collections::HashMap;

use serde::Deserialize;

use openvocab_core::{Error, Literal, Result, Term, Triple, TriplePattern, Uri};

use crate::query::{VAR_OBJECT, VAR_PREDICATE, VAR_SUBJECT};

/// Media type requested for query results.
pub const RESULTS_JSON: &str = "application/sparql-results+json";

/// One bound value.
#[derive(Debug, Clone, Deserialize)]
pub struct RdfTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
}

impl RdfTerm {
    pub fn to_term(&self) -> Result<Term> {
        match self.kind.as_str() {
            "uri" => Ok(Term::uri(Uri::parse(self.value.as_str())?)),
            // "typed-literal" is emitted by older endpoints
            "literal" | "typed-literal" => Ok(Term::Literal(Literal {
                value: self.value.clone(),
                language: self.lang.clone(),
                datatype: match &self.datatype {
                    Some(dt) if self.lang.is_none() => Some(Uri::parse(dt.as_str())?),
                    _ => None,
                },
            })),
            "bnode" => Err(Error::Serialization(format!(
                "Blank node _:{} in results; stored resources must be named",
                self.value
            ))),
            other => Err(Error::Serialization(format!("Unknown term type: {}", other))),
        }
    }

    pub fn to_uri(&self) -> Result<Uri> {
        match self.to_term()? {
            Term::Uri { value } => Ok(value),
            Term::Literal(_) => Err(Error::Serialization(format!(
                "Expected IRI, got literal '{}'",
                self.value
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Bindings {
    bindings: Vec<HashMap<String, RdfTerm>>,
}

/// Parsed SELECT or ASK response.
#[derive(Debug, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    results: Option<Bindings>,
    #[serde(default)]
    boolean: Option<bool>,
}

impl QueryResults {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Result of an ASK query.
    pub fn boolean(&self) -> Result<bool> {
        self.boolean
            .ok_or_else(|| Error::Serialization("ASK response has no boolean".to_string()))
    }

    /// Rows of a SELECT query.
    pub fn rows(&self) -> Result<&[HashMap<String, RdfTerm>]> {
        self.results
            .as_ref()
            .map(|b| b.bindings.as_slice())
            .ok_or_else(|| Error::Serialization("SELECT response has no results".to_string()))
    }

    /// Rebuild triples from a SELECT made by [`crate::query::select_triples`].
    ///
    /// Bound pattern positions fill whatever the row leaves out.
    pub fn into_triples(self, pattern: &TriplePattern) -> Result<Vec<Triple>> {
        let rows = self.rows()?;
        let mut triples = Vec::with_capacity(rows.len());
        for row in rows {
            let subject = match &pattern.subject {
                Some(s) => s.clone(),
                None => required(row, VAR_SUBJECT)?.to_uri()?,
            };
            let predicate = match &pattern.predicate {
                Some(p) => p.clone(),
                None => required(row, VAR_PREDICATE)?.to_uri()?,
            };
            let object = match &pattern.object {
                Some(o) => o.clone(),
                None => required(row, VAR_OBJECT)?.to_term()?,
            };
            triples.push(Triple {
                subject,
                predicate,
                object,
            });
        }
        Ok(triples)
    }
}

fn required<'a>(row: &'a HashMap<String, RdfTerm>, var: &str) -> Result<&'a RdfTerm> {
    row.get(var)
        .ok_or_else(|| Error::Serialization(format!("Result row lacks ?{}", var)))
}
