//! Shared harness for engine integration tests.
//!
//! Seeds an in-memory store with two tenants and one user per role.

#![allow(dead_code)]

use std::sync::Arc;

use openvocab_core::namespaces::{openskos, skos};
use openvocab_core::{
    new_v7, Literal, MemoryTripleStore, MemoryUserStore, Resource, ResourceType, Role, Term,
    Triple, TripleStore, Uri, User,
};
use openvocab_engine::{EngineConfig, GraphTenantResolver, ResourceManager};

pub const TENANT: &str = "acme";
pub const OTHER_TENANT: &str = "globex";

pub const GUEST_KEY: &str = "guest-key";
pub const USER_KEY: &str = "user-key";
pub const EDITOR_KEY: &str = "editor-key";
pub const ADMIN_KEY: &str = "admin-key";
pub const ROOT_KEY: &str = "root-key";
pub const OUTSIDER_KEY: &str = "outsider-key";

pub fn uri(s: &str) -> Uri {
    Uri::parse(s).unwrap()
}

pub fn tenant_uri(code: &str) -> Uri {
    uri(&format!("http://example.com/tenants/{}", code))
}

pub fn concept_uri(name: &str) -> Uri {
    uri(&format!("http://example.com/concepts/{}", name))
}

fn user(name: &str, key: &str, role: Role, tenant: &str) -> User {
    User::new(
        name,
        key,
        uri(&format!("http://example.com/users/{}", name)),
        role,
        tenant,
    )
}

pub struct Harness {
    pub store: MemoryTripleStore,
    pub manager: ResourceManager,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(EngineConfig::default()).await
    }

    pub async fn with_config(config: EngineConfig) -> Self {
        Self::with_store(MemoryTripleStore::new(), config).await
    }

    pub async fn with_store(store: MemoryTripleStore, config: EngineConfig) -> Self {
        for code in [TENANT, OTHER_TENANT] {
            store
                .insert_triples(&[
                    Triple::new(
                        tenant_uri(code),
                        openvocab_core::namespaces::rdf::type_(),
                        ResourceType::Tenant.type_uri(),
                    ),
                    Triple::new(tenant_uri(code), openskos::code(), Literal::plain(code)),
                ])
                .await
                .unwrap();
        }

        let users = MemoryUserStore::with_users([
            user("guest", GUEST_KEY, Role::Guest, TENANT),
            user("user", USER_KEY, Role::User, TENANT),
            user("editor", EDITOR_KEY, Role::Editor, TENANT),
            user("admin", ADMIN_KEY, Role::Administrator, TENANT),
            user("root", ROOT_KEY, Role::Root, TENANT),
            user("outsider", OUTSIDER_KEY, Role::Editor, OTHER_TENANT),
        ]);

        let shared: Arc<dyn TripleStore> = Arc::new(store.clone());
        let manager = ResourceManager::new(
            shared.clone(),
            Arc::new(users),
            Arc::new(GraphTenantResolver::new(shared)),
            config,
        )
        .unwrap();
        Self { store, manager }
    }

    /// Create a concept with a fresh UUID as the editor.
    pub async fn concept(&self, name: &str) -> Uri {
        let created = self
            .manager
            .create(&concept(name), EDITOR_KEY, TENANT, false)
            .await
            .unwrap();
        created.uri.unwrap()
    }

    /// Add an edge as the editor.
    pub async fn edge(&self, s: &Uri, p: Uri, o: &Uri) -> openvocab_core::Result<()> {
        self.manager
            .add_relation_edge(s, &p, o, EDITOR_KEY, TENANT)
            .await
    }
}

/// A submittable concept carrying its own URI and UUID.
pub fn concept(name: &str) -> Resource {
    let mut res = Resource::new(concept_uri(name), skos::concept());
    res.add_property(openskos::uuid(), Literal::plain(new_v7().to_string()));
    res.add_property(skos::pref_label(), Literal::lang(name, "en"));
    res
}

/// A concept with no identifiers for server-side generation.
pub fn blank_concept(label: &str) -> Resource {
    let mut res = Resource::blank(skos::concept());
    res.add_property(skos::pref_label(), Literal::lang(label, "en"));
    res
}

pub fn status_of(res: &Resource) -> Option<String> {
    res.first(&openskos::status()).map(Term::lexical).map(str::to_string)
}
