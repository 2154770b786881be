//! Vocabulary namespaces and well-known terms.
//!
//! Each vocabulary module exposes its `NAMESPACE` prefix and one constructor
//! per term. [`StandardNamespaces`] is the default [`NamespaceRegistry`].

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::rdf::Uri;
use crate::traits::NamespaceRegistry;

macro_rules! vocabulary {
    ($ns:literal; $($name:ident => $local:literal),* $(,)?) => {
        /// Namespace prefix of this vocabulary.
        pub const NAMESPACE: &str = $ns;
        $(
            #[doc = concat!("`", $ns, $local, "`")]
            pub fn $name() -> Uri {
                Uri::from_static(concat!($ns, $local))
            }
        )*
    };
}

pub mod rdf {
    use crate::rdf::Uri;
    vocabulary!("http://www.w3.org/1999/02/22-rdf-syntax-ns#";
        type_ => "type",
    );
}

pub mod rdfs {
    use crate::rdf::Uri;
    vocabulary!("http://www.w3.org/2000/01/rdf-schema#";
        label => "label",
        comment => "comment",
    );
}

pub mod owl {
    use crate::rdf::Uri;
    vocabulary!("http://www.w3.org/2002/07/owl#";
        object_property => "ObjectProperty",
        inverse_of => "inverseOf",
        symmetric_property => "SymmetricProperty",
    );
}

pub mod xsd {
    use crate::rdf::Uri;
    vocabulary!("http://www.w3.org/2001/XMLSchema#";
        date_time => "dateTime",
        boolean => "boolean",
    );
}

pub mod skos {
    use crate::rdf::Uri;
    vocabulary!("http://www.w3.org/2004/02/skos/core#";
        concept => "Concept",
        concept_scheme => "ConceptScheme",
        collection => "Collection",
        ordered_collection => "OrderedCollection",
        in_scheme => "inScheme",
        has_top_concept => "hasTopConcept",
        top_concept_of => "topConceptOf",
        pref_label => "prefLabel",
        alt_label => "altLabel",
        hidden_label => "hiddenLabel",
        notation => "notation",
        change_note => "changeNote",
        definition => "definition",
        editorial_note => "editorialNote",
        example => "example",
        history_note => "historyNote",
        note => "note",
        scope_note => "scopeNote",
        broader => "broader",
        broader_transitive => "broaderTransitive",
        narrower => "narrower",
        narrower_transitive => "narrowerTransitive",
        related => "related",
        semantic_relation => "semanticRelation",
        member => "member",
        member_list => "memberList",
        broad_match => "broadMatch",
        close_match => "closeMatch",
        exact_match => "exactMatch",
        mapping_relation => "mappingRelation",
        narrow_match => "narrowMatch",
        related_match => "relatedMatch",
    );

    /// Lexical label predicates.
    pub fn label_properties() -> [Uri; 3] {
        [pref_label(), alt_label(), hidden_label()]
    }

    /// Documentation note predicates.
    pub fn documentation_properties() -> [Uri; 7] {
        [
            change_note(),
            definition(),
            editorial_note(),
            example(),
            history_note(),
            note(),
            scope_note(),
        ]
    }

    /// Built-in concept-to-concept relation predicates.
    pub fn concept_relations() -> [Uri; 12] {
        [
            broader(),
            broader_transitive(),
            narrower(),
            narrower_transitive(),
            related(),
            semantic_relation(),
            broad_match(),
            close_match(),
            exact_match(),
            mapping_relation(),
            narrow_match(),
            related_match(),
        ]
    }
}

pub mod openskos {
    use crate::rdf::Uri;
    vocabulary!("http://openskos.org/xmlns#";
        uuid => "uuid",
        tenant => "tenant",
        set => "set",
        status => "status",
        code => "code",
        date_deleted => "dateDeleted",
        deleted_by => "deletedBy",
        modified_by => "modifiedBy",
        accepted_by => "acceptedBy",
        date_accepted => "dateAccepted",
        webpage => "webpage",
        allow_oai => "allow_oai",
        disable_search_in_other_tenants => "disableSearchInOtherTenants",
    );
}

pub mod dcterms {
    use crate::rdf::Uri;
    vocabulary!("http://purl.org/dc/terms/";
        creator => "creator",
        contributor => "contributor",
        date_submitted => "dateSubmitted",
        date_accepted => "dateAccepted",
        modified => "modified",
        title => "title",
        description => "description",
        publisher => "publisher",
        license => "license",
        source => "source",
    );
}

pub mod dcmitype {
    use crate::rdf::Uri;
    vocabulary!("http://purl.org/dc/dcmitype#";
        dataset => "Dataset",
    );
}

pub mod foaf {
    use crate::rdf::Uri;
    vocabulary!("http://xmlns.com/foaf/0.1/";
        person => "Person",
        name => "name",
        mbox => "mbox",
    );
}

pub mod org {
    use crate::rdf::Uri;
    vocabulary!("http://www.w3.org/ns/org#";
        formal_organization => "FormalOrganization",
    );
}

pub mod vcard {
    use crate::rdf::Uri;
    vocabulary!("http://www.w3.org/2006/vcard/ns#";
        org => "org",
        orgname => "orgname",
        adr => "adr",
        url => "url",
        email => "email",
    );
}

/// Prefix table used by [`StandardNamespaces`].
static PREFIXES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("rdf", rdf::NAMESPACE),
        ("rdfs", rdfs::NAMESPACE),
        ("owl", owl::NAMESPACE),
        ("xsd", xsd::NAMESPACE),
        ("skos", skos::NAMESPACE),
        ("openskos", openskos::NAMESPACE),
        ("dcterms", dcterms::NAMESPACE),
        ("dcmitype", dcmitype::NAMESPACE),
        ("foaf", foaf::NAMESPACE),
        ("org", org::NAMESPACE),
        ("vcard", vcard::NAMESPACE),
    ]
});

/// Namespaces whose predicates count as standard properties.
const STANDARD_PROPERTY_NAMESPACES: &[&str] = &[
    rdf::NAMESPACE,
    rdfs::NAMESPACE,
    owl::NAMESPACE,
    skos::NAMESPACE,
    openskos::NAMESPACE,
    dcterms::NAMESPACE,
    foaf::NAMESPACE,
    org::NAMESPACE,
    vcard::NAMESPACE,
];

/// Built-in prefix registry.
#[derive(Debug, Clone, Default)]
pub struct StandardNamespaces;

impl StandardNamespaces {
    pub fn new() -> Self {
        Self
    }

    /// Namespace for a registered prefix.
    pub fn namespace_for(prefix: &str) -> Option<&'static str> {
        PREFIXES
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, ns)| *ns)
    }
}

impl NamespaceRegistry for StandardNamespaces {
    fn is_standard_property(&self, predicate: &Uri) -> bool {
        STANDARD_PROPERTY_NAMESPACES
            .iter()
            .any(|ns| predicate.in_namespace(ns))
    }

    fn expand_short_name(&self, name: &str) -> Result<Uri> {
        match name.split_once(':') {
            Some((prefix, local)) => match Self::namespace_for(prefix) {
                Some(ns) => Uri::parse(format!("{}{}", ns, local)),
                // Already absolute, e.g. "http://..."
                None => Uri::parse(name),
            },
            None => Err(Error::Config(format!(
                "Cannot expand '{}': no namespace prefix",
                name
            ))),
        }
    }
}
