//! Create and update through the full pipeline.

mod common;

use common::*;
use openvocab_core::namespaces::{dcterms, openskos, skos};
use openvocab_core::uuid_utils::is_uuid;
use openvocab_core::{ConceptStatus, Error, Literal, ResourceType, Term};
use openvocab_engine::{CreateOptions, EngineConfig};

#[tokio::test]
async fn test_create_round_trip() {
    let h = Harness::new().await;
    let submitted = concept("apple");

    let created = h
        .manager
        .create(&submitted, EDITOR_KEY, TENANT, false)
        .await
        .unwrap();
    let fetched = h.manager.fetch(&concept_uri("apple")).await.unwrap();

    assert_eq!(created, fetched);
    for (predicate, values) in &submitted.properties {
        for value in values {
            assert!(fetched.property(predicate).contains(value), "lost {predicate}");
        }
    }
    assert_eq!(status_of(&created).as_deref(), Some("candidate"));
    assert_eq!(
        created.uris(&openskos::tenant()).next(),
        Some(&tenant_uri(TENANT))
    );
    assert!(created.has_property(&dcterms::date_submitted()));
    assert!(created.has_property(&dcterms::creator()));
}

#[tokio::test]
async fn test_find_by_uuid_and_uri() {
    let h = Harness::new().await;
    let created = h
        .manager
        .create(&concept("pear"), EDITOR_KEY, TENANT, false)
        .await
        .unwrap();

    let by_uuid = h.manager.find_by_id(created.uuid().unwrap()).await.unwrap();
    let by_uri = h
        .manager
        .find_by_id(concept_uri("pear").as_str())
        .await
        .unwrap();
    assert_eq!(by_uuid, created);
    assert_eq!(by_uri, created);

    let missing = h
        .manager
        .find_by_id(&openvocab_core::new_v7().to_string())
        .await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_generated_identifiers() {
    let h = Harness::new().await;
    let created = h
        .manager
        .create(&blank_concept("plum"), EDITOR_KEY, TENANT, true)
        .await
        .unwrap();

    let uri = created.uri.clone().unwrap();
    let uuid = created.uuid().unwrap();
    assert!(is_uuid(uuid));
    assert!(uri.as_str().starts_with(&h.manager.config().uri_base));
    assert!(uri.as_str().ends_with(uuid));
}

#[tokio::test]
async fn test_identifier_contract() {
    let h = Harness::new().await;

    // Generation requested but identifiers supplied.
    let err = h
        .manager
        .create(&concept("fig"), EDITOR_KEY, TENANT, true)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    // Generation not requested and no URI.
    let err = h
        .manager
        .create(&blank_concept("fig"), EDITOR_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("no URI")));

    // URI without UUID.
    let mut no_uuid = concept("fig");
    no_uuid.unset_property(&openskos::uuid());
    let err = h
        .manager
        .create(&no_uuid, EDITOR_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("openskos:uuid")));

    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_create_over_existing_uri_is_conflict() {
    let h = Harness::new().await;
    h.concept("kiwi").await;

    let err = h
        .manager
        .create(&concept("kiwi"), EDITOR_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(ref m) if m.contains("use update")));
}

#[tokio::test]
async fn test_reused_uuid_is_conflict() {
    let h = Harness::new().await;
    let first = h
        .manager
        .create(&concept("lime"), EDITOR_KEY, TENANT, false)
        .await
        .unwrap();

    let mut second = concept("lemon");
    second.set_property(
        openskos::uuid(),
        vec![Term::Literal(Literal::plain(first.uuid().unwrap()))],
    );
    let err = h
        .manager
        .create(&second, EDITOR_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_resource_collects_messages() {
    let h = Harness::new().await;
    let mut res = concept("melon");
    res.unset_property(&skos::pref_label());
    res.add_property(skos::alt_label(), Literal::lang("melon", "en"));
    res.add_property(skos::hidden_label(), Literal::lang("melon", "en"));

    let err = h
        .manager
        .create(&res, EDITOR_KEY, TENANT, false)
        .await
        .unwrap_err();
    match err {
        Error::InvalidInput(msg) => {
            assert!(msg.contains("required"));
            assert!(msg.contains("both"));
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_requested_status_must_be_allowed() {
    let h = Harness::new().await;
    let approved = h
        .manager
        .create_with(
            &concept("cherry"),
            EDITOR_KEY,
            TENANT,
            CreateOptions {
                status: Some(ConceptStatus::Approved),
                ..CreateOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(status_of(&approved).as_deref(), Some("approved"));

    let err = h
        .manager
        .create_with(
            &concept("grape"),
            EDITOR_KEY,
            TENANT,
            CreateOptions {
                status: Some(ConceptStatus::Rejected),
                ..CreateOptions::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_update_keeps_server_stamps() {
    let h = Harness::new().await;
    let created = h
        .manager
        .create(&concept("peach"), EDITOR_KEY, TENANT, false)
        .await
        .unwrap();

    let mut next = concept("peach");
    next.unset_property(&openskos::uuid());
    next.add_property(skos::definition(), Literal::lang("A stone fruit", "en"));
    let updated = h.manager.update(&next, EDITOR_KEY, TENANT).await.unwrap();

    assert_eq!(updated.uuid(), created.uuid());
    assert_eq!(
        updated.first(&dcterms::date_submitted()),
        created.first(&dcterms::date_submitted())
    );
    assert!(updated.has_property(&dcterms::modified()));
    assert!(updated.has_property(&skos::definition()));
    assert_eq!(status_of(&updated).as_deref(), Some("candidate"));
}

#[tokio::test]
async fn test_update_of_immutable_property_rejected() {
    let h = Harness::new().await;
    h.concept("mango").await;

    let mut next = concept("mango");
    // Fresh UUID differs from the stored one.
    next.add_property(dcterms::title(), Literal::plain("Mango"));
    let err = h.manager.update(&next, EDITOR_KEY, TENANT).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("cannot be changed")));
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let h = Harness::new().await;
    let err = h
        .manager
        .update(&concept("ghost"), EDITOR_KEY, TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_update_of_deleted_concept_is_gone() {
    let h = Harness::new().await;
    h.concept("quince").await;
    h.manager
        .delete(&concept_uri("quince"), EDITOR_KEY, TENANT)
        .await
        .unwrap();

    let err = h
        .manager
        .update(&concept("quince"), EDITOR_KEY, TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Gone(_)));
}

#[tokio::test]
async fn test_unknown_key_and_tenant() {
    let h = Harness::new().await;

    let err = h
        .manager
        .create(&concept("date"), "nobody", TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(ref m) if m.contains("No such API-key")));

    let err = h
        .manager
        .create(&concept("date"), EDITOR_KEY, "initech", false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = h
        .manager
        .create(&concept("date"), EDITOR_KEY, " ", false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_unknown_set_is_config_error() {
    let h = Harness::new().await;
    let err = h
        .manager
        .create_with(
            &concept("olive"),
            EDITOR_KEY,
            TENANT,
            CreateOptions {
                set_code: Some("missing".to_string()),
                ..CreateOptions::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_authorization() {
    let h = Harness::new().await;

    let err = h
        .manager
        .create(&concept("guava"), GUEST_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(ref m) if m.contains("guest")));

    // Acting in a tenant the user does not belong to.
    let err = h
        .manager
        .create(&concept("guava"), OUTSIDER_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    // Plain users may propose concepts but not delete them.
    let created = h
        .manager
        .create(&concept("guava"), USER_KEY, TENANT, false)
        .await
        .unwrap();
    let err = h
        .manager
        .delete(created.uri.as_ref().unwrap(), USER_KEY, TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    // An editor from another tenant cannot touch it from their own tenant.
    let err = h
        .manager
        .delete(created.uri.as_ref().unwrap(), OUTSIDER_KEY, OTHER_TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[tokio::test]
async fn test_list_excludes_deleted_and_caps_rows() {
    let h = Harness::with_config(EngineConfig::default().with_max_rows(2)).await;
    for name in ["a", "b", "c"] {
        h.concept(name).await;
    }
    assert_eq!(
        h.manager.list(ResourceType::Concept, None).await.unwrap().len(),
        2
    );
    assert_eq!(
        h.manager
            .list(ResourceType::Concept, Some(1))
            .await
            .unwrap()
            .len(),
        1
    );

    let h = Harness::new().await;
    h.concept("a").await;
    h.concept("b").await;
    h.manager
        .delete(&concept_uri("a"), EDITOR_KEY, TENANT)
        .await
        .unwrap();
    let listed = h.manager.list(ResourceType::Concept, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].uri, Some(concept_uri("b")));
}
