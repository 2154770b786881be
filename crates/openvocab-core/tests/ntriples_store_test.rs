//! Decoding documents into the in-memory store and reading them back.

use openvocab_core::namespaces::skos;
use openvocab_core::{
    MemoryTripleStore, NTriplesCodec, ResourceDecoder, ResourceEncoder, ResourceType,
    TriplePattern, TripleStore, Uri,
};

const DOC: &str = r#"
# A concept with two labels
<http://example.com/c/1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2004/02/skos/core#Concept> .
<http://example.com/c/1> <http://www.w3.org/2004/02/skos/core#prefLabel> "Apple"@en .
<http://example.com/c/1> <http://www.w3.org/2004/02/skos/core#altLabel> "Appel"@nl .
<http://example.com/c/1> <http://www.w3.org/2004/02/skos/core#broader> <http://example.com/c/0> .
"#;

#[tokio::test]
async fn test_decoded_resource_survives_store() {
    let codec = NTriplesCodec::new();
    let resource = codec.decode(DOC).unwrap();
    assert_eq!(ResourceType::of(&resource).unwrap(), ResourceType::Concept);

    let store = MemoryTripleStore::new();
    store.insert_triples(&resource.triples().unwrap()).await.unwrap();

    let uri = Uri::parse("http://example.com/c/1").unwrap();
    let fetched = store.fetch_resource(&uri).await.unwrap().unwrap();
    assert_eq!(fetched, resource);

    let broader = store
        .find_triples(&TriplePattern::any().predicate(skos::broader()), None)
        .await
        .unwrap();
    assert_eq!(broader.len(), 1);

    let again = codec.decode(&codec.encode(&fetched).unwrap()).unwrap();
    assert_eq!(again, fetched);
}

#[tokio::test]
async fn test_replace_subject_drops_old_statements() {
    let codec = NTriplesCodec::new();
    let resource = codec.decode(DOC).unwrap();
    let store = MemoryTripleStore::new();
    store.insert_triples(&resource.triples().unwrap()).await.unwrap();

    let mut trimmed = resource.clone();
    trimmed.unset_property(&skos::alt_label());
    let uri = trimmed.uri.clone().unwrap();
    store
        .replace_subject(&uri, &trimmed.triples().unwrap())
        .await
        .unwrap();

    let fetched = store.fetch_resource(&uri).await.unwrap().unwrap();
    assert!(!fetched.has_property(&skos::alt_label()));
    assert_eq!(store.len().await, 3);
}

#[test]
fn test_multiple_subjects_rejected() {
    let doc = format!("{DOC}<http://example.com/c/2> <http://www.w3.org/2004/02/skos/core#prefLabel> \"Pear\"@en .\n");
    assert!(NTriplesCodec::new().decode(&doc).is_err());
}
