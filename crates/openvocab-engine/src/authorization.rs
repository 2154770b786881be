//! Role-based permission checks.
//!
//! | Type                            | create        | edit          | delete        |
//! |---------------------------------|---------------|---------------|---------------|
//! | Concept                         | user          | editor (*)    | editor        |
//! | ConceptScheme, SkosCollection   | editor        | editor        | editor        |
//! | Set, Person, RelationDefinition | administrator | administrator | administrator |
//! | Tenant                          | root          | administrator | root          |
//!
//! (*) A plain user may also edit candidate concepts they created.
//!
//! Root passes everything. Everyone else acts only inside their own tenant
//! and only on resources stamped with that tenant. The gate answers yes or
//! no; callers word the refusal.

use std::sync::Arc;

use openvocab_core::namespaces::dcterms;
use openvocab_core::{
    ConceptStatus, Resource, ResourceType, ResourceTypeRegistry, Role, TenantContext, User,
};

/// Mutation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Edit,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Edit => write!(f, "edit"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    types: Arc<ResourceTypeRegistry>,
}

impl AuthorizationGate {
    pub fn new(types: Arc<ResourceTypeRegistry>) -> Self {
        Self { types }
    }

    /// Whether `user`, acting in `tenant`, may apply `operation` to `resource`.
    pub fn allowed(
        &self,
        user: &User,
        tenant: &TenantContext,
        resource: &Resource,
        operation: Operation,
    ) -> bool {
        if !user.is_active() || !user.is_api_allowed() {
            return false;
        }
        if user.is_root() {
            return true;
        }
        if user.tenant_code != tenant.code {
            return false;
        }
        let Ok(spec) = self.types.spec_for(resource) else {
            return false;
        };

        if spec.kind == ResourceType::Tenant {
            // Only root founds or removes tenants.
            return operation == Operation::Edit
                && user.role.at_least(Role::Administrator)
                && resource.uri.as_ref() == Some(&tenant.uri);
        }
        if !tenant.owns(resource) {
            return false;
        }
        if spec.admin_only_create {
            return user.role.at_least(Role::Administrator);
        }

        match (spec.kind, operation) {
            (ResourceType::Concept, Operation::Create) => user.role.at_least(Role::User),
            (ResourceType::Concept, Operation::Edit) => {
                user.role.at_least(Role::Editor)
                    || (user.role == Role::User && own_candidate(user, resource))
            }
            _ => user.role.at_least(Role::Editor),
        }
    }
}

/// A plain user may keep editing a concept they proposed until it is reviewed.
fn own_candidate(user: &User, resource: &Resource) -> bool {
    let created = resource.uris(&dcterms::creator()).any(|c| c == &user.uri);
    let candidate = matches!(
        ConceptStatus::of(resource),
        Ok(None) | Ok(Some(ConceptStatus::Candidate))
    );
    created && candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use openvocab_core::namespaces::openskos;
    use openvocab_core::Uri;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    fn acme() -> TenantContext {
        TenantContext::new("acme", uri("http://example.com/tenant/acme"))
    }

    fn user(role: Role, tenant: &str) -> User {
        User::new(
            format!("{}-{}", role.as_str(), tenant),
            "key",
            uri(&format!("http://example.com/users/{}-{}", tenant, role.as_str())),
            role,
            tenant,
        )
    }

    fn owned(kind: ResourceType) -> Resource {
        let mut res = Resource::new(uri("http://example.com/r/1"), kind.type_uri());
        res.add_property(openskos::tenant(), acme().uri);
        res
    }

    fn gate() -> AuthorizationGate {
        AuthorizationGate::new(Arc::new(ResourceTypeRegistry::standard()))
    }

    #[test]
    fn test_concept_permissions_by_role() {
        let gate = gate();
        let concept = owned(ResourceType::Concept);
        let t = acme();

        assert!(!gate.allowed(&user(Role::Guest, "acme"), &t, &concept, Operation::Create));
        assert!(gate.allowed(&user(Role::User, "acme"), &t, &concept, Operation::Create));
        assert!(!gate.allowed(&user(Role::User, "acme"), &t, &concept, Operation::Delete));
        assert!(gate.allowed(&user(Role::Editor, "acme"), &t, &concept, Operation::Delete));
        assert!(gate.allowed(&user(Role::Administrator, "acme"), &t, &concept, Operation::Edit));
    }

    #[test]
    fn test_user_edits_only_own_candidates() {
        let gate = gate();
        let author = user(Role::User, "acme");
        let mut concept = owned(ResourceType::Concept);
        concept.add_property(dcterms::creator(), author.uri.clone());
        concept.add_property(openskos::status(), ConceptStatus::Candidate.to_term());
        assert!(gate.allowed(&author, &acme(), &concept, Operation::Edit));

        concept.set_property(openskos::status(), vec![ConceptStatus::Approved.to_term()]);
        assert!(!gate.allowed(&author, &acme(), &concept, Operation::Edit));

        let mut someone_elses = owned(ResourceType::Concept);
        someone_elses.add_property(dcterms::creator(), uri("http://example.com/users/other"));
        assert!(!gate.allowed(&author, &acme(), &someone_elses, Operation::Edit));
    }

    #[test]
    fn test_tenant_isolation() {
        let gate = gate();
        let concept = owned(ResourceType::Concept);
        let other_editor = user(Role::Editor, "other");
        let other = TenantContext::new("other", uri("http://example.com/tenant/other"));

        // Wrong request tenant for the user.
        assert!(!gate.allowed(&other_editor, &acme(), &concept, Operation::Edit));
        // Right request tenant, resource owned elsewhere.
        assert!(!gate.allowed(&other_editor, &other, &concept, Operation::Edit));
        // Root crosses tenants.
        assert!(gate.allowed(&user(Role::Root, "other"), &acme(), &concept, Operation::Delete));
    }

    #[test]
    fn test_admin_only_types() {
        let gate = gate();
        for kind in [ResourceType::Set, ResourceType::Person, ResourceType::RelationDefinition] {
            let res = owned(kind);
            assert!(!gate.allowed(&user(Role::Editor, "acme"), &acme(), &res, Operation::Create));
            assert!(gate.allowed(&user(Role::Administrator, "acme"), &acme(), &res, Operation::Create));
        }
    }

    #[test]
    fn test_tenant_resources() {
        let gate = gate();
        let t = acme();
        let tenant_res = Resource::new(t.uri.clone(), ResourceType::Tenant.type_uri());
        let admin = user(Role::Administrator, "acme");

        assert!(gate.allowed(&admin, &t, &tenant_res, Operation::Edit));
        assert!(!gate.allowed(&admin, &t, &tenant_res, Operation::Create));
        assert!(!gate.allowed(&admin, &t, &tenant_res, Operation::Delete));
        assert!(gate.allowed(&user(Role::Root, "acme"), &t, &tenant_res, Operation::Create));
    }

    #[test]
    fn test_blocked_users_denied() {
        let gate = gate();
        let mut root = user(Role::Root, "acme");
        root.active = false;
        assert!(!gate.allowed(&root, &acme(), &owned(ResourceType::Concept), Operation::Edit));

        let mut editor = user(Role::Editor, "acme");
        editor.api_allowed = false;
        let scheme = owned(ResourceType::ConceptScheme);
        assert!(!gate.allowed(&editor, &acme(), &scheme, Operation::Edit));
    }
}
