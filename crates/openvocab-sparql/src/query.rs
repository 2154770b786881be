//! SPARQL query and update text builders.
//!
//! Terms are written in N-Triples syntax, which SPARQL accepts verbatim.
//! [`openvocab_core::Uri`] already rejects the characters that would break
//! out of an IRI reference, so IRIs need no further escaping.

use openvocab_core::ntriples::encode_term;
use openvocab_core::{Triple, TriplePattern, Uri};

/// Variable names bound by [`select_triples`].
pub const VAR_SUBJECT: &str = "s";
pub const VAR_PREDICATE: &str = "p";
pub const VAR_OBJECT: &str = "o";

fn iri(uri: &Uri) -> String {
    format!("<{}>", uri)
}

/// One triple pattern with variables for unbound positions.
pub fn pattern_clause(pattern: &TriplePattern) -> String {
    let s = pattern
        .subject
        .as_ref()
        .map(iri)
        .unwrap_or_else(|| format!("?{}", VAR_SUBJECT));
    let p = pattern
        .predicate
        .as_ref()
        .map(iri)
        .unwrap_or_else(|| format!("?{}", VAR_PREDICATE));
    let o = pattern
        .object
        .as_ref()
        .map(encode_term)
        .unwrap_or_else(|| format!("?{}", VAR_OBJECT));
    format!("{} {} {} .", s, p, o)
}

/// `SELECT` over every unbound position of the pattern.
pub fn select_triples(pattern: &TriplePattern, limit: Option<usize>) -> String {
    let mut vars = Vec::new();
    if pattern.subject.is_none() {
        vars.push(format!("?{}", VAR_SUBJECT));
    }
    if pattern.predicate.is_none() {
        vars.push(format!("?{}", VAR_PREDICATE));
    }
    if pattern.object.is_none() {
        vars.push(format!("?{}", VAR_OBJECT));
    }
    // A fully bound pattern still needs a projection.
    let projection = if vars.is_empty() {
        "*".to_string()
    } else {
        vars.join(" ")
    };

    let mut query = format!(
        "SELECT {} WHERE {{ {} }}",
        projection,
        pattern_clause(pattern)
    );
    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {}", limit));
    }
    query
}

/// `ASK` whether the pattern matches.
pub fn ask(pattern: &TriplePattern) -> String {
    format!("ASK {{ {} }}", pattern_clause(pattern))
}

fn data_block(triples: &[Triple]) -> String {
    triples
        .iter()
        .map(|t| format!("{} {} {} .", iri(&t.subject), iri(&t.predicate), encode_term(&t.object)))
        .collect::<Vec<_>>()
        .join("\n  ")
}

pub fn insert_data(triples: &[Triple]) -> String {
    format!("INSERT DATA {{\n  {}\n}}", data_block(triples))
}

pub fn delete_data(triples: &[Triple]) -> String {
    format!("DELETE DATA {{\n  {}\n}}", data_block(triples))
}

/// Remove every triple of a subject.
pub fn delete_subject(subject: &Uri) -> String {
    format!("DELETE WHERE {{ {} ?p ?o . }}", iri(subject))
}

/// Remove then re-insert a subject in one update request.
pub fn replace_subject(subject: &Uri, triples: &[Triple]) -> String {
    if triples.is_empty() {
        return delete_subject(subject);
    }
    format!("{} ;\n{}", delete_subject(subject), insert_data(triples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use openvocab_core::namespaces::skos;
    use openvocab_core::Literal;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    #[test]
    fn test_select_projects_unbound_positions() {
        let pattern = TriplePattern::any().subject(uri("http://example.com/a"));
        assert_eq!(
            select_triples(&pattern, Some(10)),
            "SELECT ?p ?o WHERE { <http://example.com/a> ?p ?o . } LIMIT 10"
        );
    }

    #[test]
    fn test_select_fully_bound() {
        let pattern = TriplePattern::exact(&Triple::new(
            uri("http://example.com/a"),
            skos::broader(),
            uri("http://example.com/b"),
        ));
        assert!(select_triples(&pattern, None).starts_with("SELECT * WHERE"));
    }

    #[test]
    fn test_literal_escaping() {
        let pattern = TriplePattern::any()
            .predicate(skos::pref_label())
            .object(Literal::lang("say \"hi\"\n", "en"));
        assert_eq!(
            ask(&pattern),
            "ASK { ?s <http://www.w3.org/2004/02/skos/core#prefLabel> \"say \\\"hi\\\"\\n\"@en . }"
        );
    }

    #[test]
    fn test_insert_and_delete_data() {
        let t = Triple::new(uri("http://example.com/a"), skos::broader(), uri("http://example.com/b"));
        let insert = insert_data(&[t.clone()]);
        assert!(insert.starts_with("INSERT DATA {"));
        assert!(insert.contains("<http://example.com/a> <http://www.w3.org/2004/02/skos/core#broader> <http://example.com/b> ."));
        assert!(delete_data(&[t]).starts_with("DELETE DATA {"));
    }

    #[test]
    fn test_replace_subject() {
        let a = uri("http://example.com/a");
        let t = Triple::new(a.clone(), skos::broader(), uri("http://example.com/b"));
        let update = replace_subject(&a, &[t]);
        assert!(update.starts_with("DELETE WHERE { <http://example.com/a> ?p ?o . } ;"));
        assert!(update.contains("INSERT DATA"));
        assert_eq!(replace_subject(&a, &[]), delete_subject(&a));
    }
}
