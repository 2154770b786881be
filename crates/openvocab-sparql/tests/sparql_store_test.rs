//! SPARQL triple store against a mock endpoint.
//!
//! Verifies the protocol shape (form-encoded POSTs, Accept header, basic
//! auth) and the mapping of endpoint failures onto error kinds.

use std::time::Duration;

use openvocab_core::namespaces::skos;
use openvocab_core::{Error, ErrorKind, Literal, Term, Triple, TriplePattern, TripleStore, Uri};
use openvocab_sparql::{SparqlConfig, SparqlTripleStore};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn uri(s: &str) -> Uri {
    Uri::parse(s).unwrap()
}

fn store_for(server: &MockServer) -> SparqlTripleStore {
    SparqlTripleStore::new(SparqlConfig::for_dataset(&format!("{}/vocab", server.uri())))
        .expect("valid config")
}

#[tokio::test]
async fn test_fetch_resource_parses_select_results() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "head": { "vars": ["p", "o"] },
        "results": { "bindings": [
            { "p": { "type": "uri", "value": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type" },
              "o": { "type": "uri", "value": "http://www.w3.org/2004/02/skos/core#Concept" } },
            { "p": { "type": "uri", "value": "http://www.w3.org/2004/02/skos/core#prefLabel" },
              "o": { "type": "literal", "value": "Cat", "xml:lang": "en" } }
        ] }
    });

    Mock::given(method("POST"))
        .and(path("/vocab/query"))
        .and(header("accept", "application/sparql-results+json"))
        .and(body_string_contains("query=SELECT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let res = store
        .fetch_resource(&uri("http://example.com/c1"))
        .await
        .unwrap()
        .expect("resource should be found");

    assert_eq!(res.resource_type_uri(), Some(&skos::concept()));
    assert_eq!(
        res.first(&skos::pref_label()),
        Some(&Term::Literal(Literal::lang("Cat", "en")))
    );
}

#[tokio::test]
async fn test_empty_select_means_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vocab/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "head": { "vars": ["p", "o"] },
            "results": { "bindings": [] }
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert!(store
        .fetch_resource(&uri("http://example.com/missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_ask() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vocab/query"))
        .and(body_string_contains("query=ASK"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "head": {}, "boolean": true })),
        )
        .mount(&server)
        .await;

    let store = store_for(&server);
    let edge = Triple::new(uri("http://example.com/a"), skos::broader(), uri("http://example.com/b"));
    assert!(store.contains(&edge).await.unwrap());
}

#[tokio::test]
async fn test_insert_posts_update_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vocab/update"))
        // "admin:secret"
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .and(body_string_contains("update=INSERT+DATA"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = SparqlConfig::for_dataset(&format!("{}/vocab", server.uri()))
        .with_credentials("admin", "secret");
    let store = SparqlTripleStore::new(config).unwrap();
    let edge = Triple::new(uri("http://example.com/a"), skos::broader(), uri("http://example.com/b"));
    store.insert_triples(&[edge]).await.unwrap();
}

#[tokio::test]
async fn test_empty_writes_skip_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.insert_triples(&[]).await.unwrap();
    store.delete_triples(&[]).await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_store_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.ask(&TriplePattern::any()).await.unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)));
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
}

#[tokio::test]
async fn test_client_error_is_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("parse error"))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.delete_subject(&uri("http://example.com/a")).await.unwrap_err();
    assert!(matches!(err, Error::Request(ref msg) if msg.contains("parse error")));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "head": {}, "boolean": true }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = SparqlConfig::for_dataset(&format!("{}/vocab", server.uri())).with_timeout_secs(1);
    let store = SparqlTripleStore::new(config).unwrap();
    let err = store.ask(&TriplePattern::any()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
}
