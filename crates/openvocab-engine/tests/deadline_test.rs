//! Request deadline and store failures.

mod common;

use std::time::Duration;

use common::*;
use openvocab_core::{Error, MemoryTripleStore};
use openvocab_engine::EngineConfig;

#[tokio::test(start_paused = true)]
async fn test_slow_store_hits_deadline() {
    let config = EngineConfig::default().with_request_timeout(Duration::from_millis(100));
    let h = Harness::with_store(MemoryTripleStore::new().with_latency_ms(40), config).await;

    let err = h
        .manager
        .create(&concept("slow"), EDITOR_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)));
    assert_eq!(h.store.write_count(), 2);
}

#[tokio::test]
async fn test_unavailable_store() {
    let h = Harness::new().await;
    h.concept("a").await;
    h.store.set_unavailable(true);

    let err = h.manager.fetch(&concept_uri("a")).await.unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)));
    let err = h
        .manager
        .delete(&concept_uri("a"), EDITOR_KEY, TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)));

    h.store.set_unavailable(false);
    assert!(h.manager.fetch(&concept_uri("a")).await.is_ok());
}
