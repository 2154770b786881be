//! Deletion guard and soft delete.

mod common;

use common::*;
use openvocab_core::namespaces::{dcterms, openskos, rdfs, skos};
use openvocab_core::{new_v7, Error, Literal, Resource, ResourceType};

#[tokio::test]
async fn test_idempotent_soft_delete() {
    let h = Harness::new().await;
    let a = h.concept("a").await;

    let before = h.manager.delete(&a, EDITOR_KEY, TENANT).await.unwrap();
    assert_eq!(status_of(&before).as_deref(), Some("candidate"));

    let retired = h.manager.fetch(&a).await.unwrap();
    assert_eq!(status_of(&retired).as_deref(), Some("deleted"));
    assert!(retired.has_property(&openskos::date_deleted()));
    assert_eq!(
        retired.uris(&openskos::deleted_by()).next(),
        Some(&uri("http://example.com/users/editor"))
    );
    // Everything else survives.
    assert_eq!(retired.uuid(), before.uuid());
    assert_eq!(
        retired.first(&skos::pref_label()),
        before.first(&skos::pref_label())
    );

    let err = h.manager.delete(&a, EDITOR_KEY, TENANT).await.unwrap_err();
    assert!(matches!(err, Error::Gone(_)));
}

#[tokio::test]
async fn test_deletion_guard() {
    let h = Harness::new().await;
    let a = h.concept("a").await;
    let b = h.concept("b").await;
    h.edge(&a, skos::broader(), &b).await.unwrap();

    assert!(!h.manager.can_delete(&b).await.unwrap());
    assert!(h.manager.can_delete(&a).await.unwrap());
    let err = h.manager.delete(&b, EDITOR_KEY, TENANT).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(ref m) if m.contains("still referenced")));
    let untouched = h.manager.fetch(&b).await.unwrap();
    assert_eq!(status_of(&untouched).as_deref(), Some("candidate"));

    h.manager
        .remove_relation_edge(&a, &skos::broader(), &b, EDITOR_KEY, TENANT)
        .await
        .unwrap();
    assert!(h.manager.can_delete(&b).await.unwrap());
    h.manager.delete(&b, EDITOR_KEY, TENANT).await.unwrap();
}

#[tokio::test]
async fn test_retired_referrer_releases_target() {
    let h = Harness::new().await;
    let a = h.concept("a").await;
    let b = h.concept("b").await;
    h.edge(&a, skos::related(), &b).await.unwrap();

    h.manager.delete(&a, EDITOR_KEY, TENANT).await.unwrap();
    h.manager.delete(&b, EDITOR_KEY, TENANT).await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let h = Harness::new().await;
    let err = h
        .manager
        .delete(&concept_uri("ghost"), EDITOR_KEY, TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_hard_delete_removes_triples() {
    let h = Harness::new().await;
    let scheme_uri = uri("http://example.com/schemes/fruit");
    let mut scheme = Resource::new(scheme_uri.clone(), ResourceType::ConceptScheme.type_uri());
    scheme.add_property(openskos::uuid(), Literal::plain(new_v7().to_string()));
    scheme.add_property(dcterms::title(), Literal::lang("Fruit", "en"));
    h.manager
        .create(&scheme, EDITOR_KEY, TENANT, false)
        .await
        .unwrap();

    let mut member = concept("apple");
    member.add_property(skos::in_scheme(), scheme_uri.clone());
    h.manager
        .create(&member, EDITOR_KEY, TENANT, false)
        .await
        .unwrap();

    let err = h
        .manager
        .delete(&scheme_uri, EDITOR_KEY, TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    h.manager
        .delete(&concept_uri("apple"), EDITOR_KEY, TENANT)
        .await
        .unwrap();
    h.manager
        .delete(&scheme_uri, EDITOR_KEY, TENANT)
        .await
        .unwrap();
    let err = h.manager.fetch(&scheme_uri).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_relation_definition_requires_admin() {
    let h = Harness::new().await;
    let mut definition = Resource::new(
        uri("http://example.com/rel/mentors"),
        ResourceType::RelationDefinition.type_uri(),
    );
    definition.add_property(openskos::uuid(), Literal::plain(new_v7().to_string()));
    definition.add_property(rdfs::label(), Literal::plain("mentors"));

    let err = h
        .manager
        .create(&definition, EDITOR_KEY, TENANT, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    let created = h
        .manager
        .create(&definition, ADMIN_KEY, TENANT, false)
        .await
        .unwrap();
    let err = h
        .manager
        .delete(created.uri.as_ref().unwrap(), EDITOR_KEY, TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    h.manager
        .delete(created.uri.as_ref().unwrap(), ADMIN_KEY, TENANT)
        .await
        .unwrap();
}
