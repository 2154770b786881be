//! Resource manager: the mutation pipeline.
//!
//! Create and update run
//!
//! ```text
//! Received -> IdentifierResolved -> Preprocessed -> Validated -> Authorized -> Persisted
//! ```
//!
//! with `Rejected` reachable from every step. Nothing is written before
//! `Authorized`. Create and update answer with the resource as re-read from
//! the store, not the in-memory copy that was sent.
//!
//! Every public operation runs under [`EngineConfig::request_timeout`]; an
//! overrun abandons the operation and reports `StoreUnavailable`. Nothing is
//! retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use openvocab_core::namespaces::{openskos, rdf};
use openvocab_core::uuid_utils::is_uuid;
use openvocab_core::{
    ConceptStatus, DeletionPolicy, Error, Literal, NamespaceRegistry, Resource, ResourceType,
    ResourceTypeRegistry, Result, StandardNamespaces, TenantContext, TenantResolver, Term, Triple,
    TriplePattern, TripleStore, Uri, User, UserStore,
};

use crate::authorization::{AuthorizationGate, Operation};
use crate::config::EngineConfig;
use crate::deletion::DeletionGuard;
use crate::identity::IdentityResolver;
use crate::preprocess::{MutationContext, Preprocessor};
use crate::registry::RelationRegistry;
use crate::relations::RelationIntegrityChecker;
use crate::tenants::SetResolver;
use crate::validation::{ResourceValidator, ValidationMode};

/// Pipeline states a mutation passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Received,
    IdentifierResolved,
    Preprocessed,
    Validated,
    Authorized,
    Persisted,
    Rejected,
}

impl std::fmt::Display for MutationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::IdentifierResolved => write!(f, "identifier_resolved"),
            Self::Preprocessed => write!(f, "preprocessed"),
            Self::Validated => write!(f, "validated"),
            Self::Authorized => write!(f, "authorized"),
            Self::Persisted => write!(f, "persisted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

fn transition(op: &'static str, uri: &Uri, state: MutationState) {
    debug!(
        subsystem = "engine",
        component = "manager",
        op,
        resource_uri = %uri,
        state = %state,
        "Mutation state"
    );
}

/// Request parameters for [`ResourceManager::create_with`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Mint URI and UUID instead of requiring them.
    pub auto_generate_identifiers: bool,
    /// Code of a set (within the request tenant) the resource joins.
    pub set_code: Option<String>,
    /// Initial status for a concept.
    pub status: Option<ConceptStatus>,
}

/// Request parameters for [`ResourceManager::update_with`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub set_code: Option<String>,
}

/// Orchestrates every mutation against one store.
pub struct ResourceManager {
    store: Arc<dyn TripleStore>,
    users: Arc<dyn UserStore>,
    tenants: Arc<dyn TenantResolver>,
    sets: SetResolver,
    types: Arc<ResourceTypeRegistry>,
    registry: RelationRegistry,
    config: EngineConfig,
    identity: IdentityResolver,
    preprocessor: Preprocessor,
    validator: ResourceValidator,
    relations: RelationIntegrityChecker,
    gate: AuthorizationGate,
    guard: DeletionGuard,
    relation_lock: Mutex<()>,
}

impl ResourceManager {
    /// Wire the pipeline over a store with the standard type table and
    /// namespace registry.
    pub fn new(
        store: Arc<dyn TripleStore>,
        users: Arc<dyn UserStore>,
        tenants: Arc<dyn TenantResolver>,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::with_registries(
            store,
            users,
            tenants,
            config,
            Arc::new(ResourceTypeRegistry::standard()),
            Arc::new(StandardNamespaces::new()),
        )
    }

    pub fn with_registries(
        store: Arc<dyn TripleStore>,
        users: Arc<dyn UserStore>,
        tenants: Arc<dyn TenantResolver>,
        config: EngineConfig,
        types: Arc<ResourceTypeRegistry>,
        namespaces: Arc<dyn NamespaceRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = RelationRegistry::new(store.clone(), config.custom_relation_namespaces.clone());
        let relations = RelationIntegrityChecker::new(
            store.clone(),
            registry.clone(),
            types.clone(),
            config.max_traversal_nodes,
        );
        info!(
            subsystem = "engine",
            component = "manager",
            uri_base = %config.uri_base,
            request_timeout_secs = config.request_timeout.as_secs(),
            serialize_relation_writes = config.serialize_relation_writes,
            "Resource manager ready"
        );
        Ok(Self {
            sets: SetResolver::new(store.clone()),
            identity: IdentityResolver::new(config.uri_base.clone()),
            preprocessor: Preprocessor::new(config.allowed_initial_statuses.clone()),
            validator: ResourceValidator::new(store.clone(), types.clone(), namespaces),
            gate: AuthorizationGate::new(types.clone()),
            guard: DeletionGuard::new(store.clone()),
            relation_lock: Mutex::new(()),
            store,
            users,
            tenants,
            types,
            registry,
            config,
            relations,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TripleStore> {
        &self.store
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Admit a new resource into the graph.
    pub async fn create(
        &self,
        resource: &Resource,
        actor_key: &str,
        tenant_code: &str,
        auto_generate_identifiers: bool,
    ) -> Result<Resource> {
        let options = CreateOptions {
            auto_generate_identifiers,
            ..CreateOptions::default()
        };
        self.create_with(resource, actor_key, tenant_code, options)
            .await
    }

    pub async fn create_with(
        &self,
        resource: &Resource,
        actor_key: &str,
        tenant_code: &str,
        options: CreateOptions,
    ) -> Result<Resource> {
        self.mutation(
            "create",
            self.create_inner(resource, actor_key, tenant_code, &options),
        )
        .await
    }

    /// Replace a stored resource with a new version.
    pub async fn update(
        &self,
        resource: &Resource,
        actor_key: &str,
        tenant_code: &str,
    ) -> Result<Resource> {
        self.update_with(resource, actor_key, tenant_code, UpdateOptions::default())
            .await
    }

    pub async fn update_with(
        &self,
        resource: &Resource,
        actor_key: &str,
        tenant_code: &str,
        options: UpdateOptions,
    ) -> Result<Resource> {
        self.mutation(
            "update",
            self.update_inner(resource, actor_key, tenant_code, &options),
        )
        .await
    }

    /// Remove a resource; returns the representation it had before deletion.
    ///
    /// Concepts are soft-deleted, every other type loses all its triples.
    pub async fn delete(&self, uri: &Uri, actor_key: &str, tenant_code: &str) -> Result<Resource> {
        self.mutation("delete", self.delete_inner(uri, actor_key, tenant_code))
            .await
    }

    /// Add one relation edge between two existing concepts.
    pub async fn add_relation_edge(
        &self,
        subject: &Uri,
        predicate: &Uri,
        object: &Uri,
        actor_key: &str,
        tenant_code: &str,
    ) -> Result<()> {
        self.mutation(
            "add_relation_edge",
            self.edge_inner(subject, predicate, object, actor_key, tenant_code, false),
        )
        .await
    }

    /// Remove one relation edge (both directions for symmetric predicates).
    pub async fn remove_relation_edge(
        &self,
        subject: &Uri,
        predicate: &Uri,
        object: &Uri,
        actor_key: &str,
        tenant_code: &str,
    ) -> Result<()> {
        self.mutation(
            "remove_relation_edge",
            self.edge_inner(subject, predicate, object, actor_key, tenant_code, true),
        )
        .await
    }

    async fn create_inner(
        &self,
        resource: &Resource,
        actor_key: &str,
        tenant_code: &str,
        options: &CreateOptions,
    ) -> Result<Resource> {
        let ctx = self
            .context(actor_key, tenant_code, options.set_code.as_deref(), options.status)
            .await?;
        let spec = self.types.spec_for(resource)?;

        let identity = self
            .identity
            .resolve(resource, options.auto_generate_identifiers)?;
        let uri = identity.uri.clone();
        transition("create", &uri, MutationState::IdentifierResolved);

        if self
            .store
            .ask(&TriplePattern::any().subject(uri.clone()))
            .await?
        {
            return Err(Error::Conflict(format!(
                "Resource <{}> already exists; use update",
                uri
            )));
        }
        let uuid = Term::Literal(Literal::plain(identity.uuid.as_str()));
        if let Some(holder) = self
            .store
            .subjects_with(&openskos::uuid(), &uuid)
            .await?
            .first()
        {
            return Err(Error::Conflict(format!(
                "UUID '{}' is already used by <{}>",
                identity.uuid, holder
            )));
        }

        let prepared = self
            .preprocessor
            .for_creation(resource, &identity, spec, &ctx)?;
        transition("create", &uri, MutationState::Preprocessed);

        self.require_valid(&prepared, ValidationMode::Create, &ctx.tenant)
            .await?;

        let serial = self.relation_guard(spec.kind.is_concept()).await;
        if spec.kind.is_concept() {
            self.relations
                .check_concept_relations(&prepared, None, &ctx.tenant)
                .await?;
        }
        transition("create", &uri, MutationState::Validated);

        if !self
            .gate
            .allowed(&ctx.actor, &ctx.tenant, &prepared, Operation::Create)
        {
            return Err(denied(&ctx, Operation::Create, spec.kind, &uri));
        }
        transition("create", &uri, MutationState::Authorized);

        self.store.insert_triples(&prepared.triples()?).await?;
        drop(serial);
        self.refetch(&uri).await
    }

    async fn update_inner(
        &self,
        resource: &Resource,
        actor_key: &str,
        tenant_code: &str,
        options: &UpdateOptions,
    ) -> Result<Resource> {
        let ctx = self
            .context(actor_key, tenant_code, options.set_code.as_deref(), None)
            .await?;
        let uri = resource
            .uri
            .clone()
            .ok_or_else(|| Error::InvalidInput("Update requires a resource URI".to_string()))?;
        let spec = self.types.spec_for(resource)?;

        let stored = self.load(&uri).await?;
        if ResourceType::of(&stored).ok() != Some(spec.kind) {
            return Err(Error::NotFound(format!("No {} with URI <{}>", spec.kind, uri)));
        }
        if spec.deletion_policy == DeletionPolicy::Soft && ConceptStatus::is_deleted(&stored) {
            return Err(Error::Gone(format!("<{}> has been deleted", uri)));
        }
        transition("update", &uri, MutationState::IdentifierResolved);

        let prepared = self
            .preprocessor
            .for_update(resource, &stored, spec, &ctx)?;
        transition("update", &uri, MutationState::Preprocessed);

        self.require_valid(&prepared, ValidationMode::Update { stored: &stored }, &ctx.tenant)
            .await?;

        let serial = self.relation_guard(spec.kind.is_concept()).await;
        if spec.kind.is_concept() {
            self.relations
                .check_concept_relations(&prepared, Some(&stored), &ctx.tenant)
                .await?;
        }
        transition("update", &uri, MutationState::Validated);

        let allowed = self
            .gate
            .allowed(&ctx.actor, &ctx.tenant, &stored, Operation::Edit)
            && self
                .gate
                .allowed(&ctx.actor, &ctx.tenant, &prepared, Operation::Edit);
        if !allowed {
            return Err(denied(&ctx, Operation::Edit, spec.kind, &uri));
        }
        transition("update", &uri, MutationState::Authorized);

        self.store
            .replace_subject(&uri, &prepared.triples()?)
            .await?;
        drop(serial);
        self.refetch(&uri).await
    }

    async fn delete_inner(&self, uri: &Uri, actor_key: &str, tenant_code: &str) -> Result<Resource> {
        let ctx = self.context(actor_key, tenant_code, None, None).await?;
        let stored = self.load(uri).await?;
        let spec = self.types.spec_for(&stored)?;
        if spec.deletion_policy == DeletionPolicy::Soft && ConceptStatus::is_deleted(&stored) {
            return Err(Error::Gone(format!("<{}> is already deleted", uri)));
        }
        transition("delete", uri, MutationState::IdentifierResolved);

        if !self
            .gate
            .allowed(&ctx.actor, &ctx.tenant, &stored, Operation::Delete)
        {
            return Err(denied(&ctx, Operation::Delete, spec.kind, uri));
        }
        transition("delete", uri, MutationState::Authorized);

        let references = self.guard.inbound_references(uri).await?;
        if let Some(first) = references.first() {
            return Err(Error::Conflict(format!(
                "<{}> is still referenced by {} statement(s), e.g. <{}> <{}>",
                uri,
                references.len(),
                first.subject,
                first.predicate
            )));
        }
        transition("delete", uri, MutationState::Validated);

        match spec.deletion_policy {
            DeletionPolicy::Soft => {
                let mut retired = stored.clone();
                retired.set_property(openskos::status(), vec![ConceptStatus::Deleted.to_term()]);
                retired.set_property(openskos::date_deleted(), vec![ctx.timestamp()]);
                retired.set_property(
                    openskos::deleted_by(),
                    vec![Term::uri(ctx.actor.uri.clone())],
                );
                self.store
                    .replace_subject(uri, &retired.triples()?)
                    .await?;
            }
            DeletionPolicy::Hard => self.store.delete_subject(uri).await?,
        }
        Ok(stored)
    }

    async fn edge_inner(
        &self,
        subject: &Uri,
        predicate: &Uri,
        object: &Uri,
        actor_key: &str,
        tenant_code: &str,
        for_deletion: bool,
    ) -> Result<()> {
        let op = if for_deletion {
            "remove_relation_edge"
        } else {
            "add_relation_edge"
        };
        let ctx = self.context(actor_key, tenant_code, None, None).await?;

        let subject_res = self.load(subject).await?;
        if ResourceType::of(&subject_res)? != ResourceType::Concept {
            return Err(Error::InvalidInput(format!(
                "Relation edges connect concepts; <{}> is not a concept",
                subject
            )));
        }
        if ConceptStatus::is_deleted(&subject_res) {
            return Err(Error::Gone(format!("<{}> has been deleted", subject)));
        }
        transition(op, subject, MutationState::IdentifierResolved);

        let serial = self.relation_guard(true).await;
        let kind = self
            .relations
            .check_single_edge(subject, predicate, object, for_deletion, &ctx.tenant)
            .await?;
        transition(op, subject, MutationState::Validated);

        let operation = Operation::Edit;
        let mut allowed = self
            .gate
            .allowed(&ctx.actor, &ctx.tenant, &subject_res, operation);
        match self.store.fetch_resource(object).await? {
            Some(object_res) => {
                allowed = allowed
                    && self
                        .gate
                        .allowed(&ctx.actor, &ctx.tenant, &object_res, operation)
            }
            None if !for_deletion => {
                return Err(Error::Reference(format!(
                    "Target <{}> of <{}> does not exist",
                    object, predicate
                )))
            }
            None => {}
        }
        if !allowed {
            return Err(denied(&ctx, operation, ResourceType::Concept, subject));
        }
        transition(op, subject, MutationState::Authorized);

        let edge = Triple::new(subject.clone(), predicate.clone(), object.clone());
        if for_deletion {
            let mut edges = vec![edge];
            if kind.is_symmetric() {
                edges.push(Triple::new(object.clone(), predicate.clone(), subject.clone()));
            }
            self.store.delete_triples(&edges).await?;
        } else {
            self.store.insert_triples(&[edge]).await?;
        }
        drop(serial);
        Ok(())
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Stored resource by URI.
    pub async fn fetch(&self, uri: &Uri) -> Result<Resource> {
        self.deadline(self.load(uri)).await
    }

    /// Whether `uri` could be deleted now, without deleting it.
    ///
    /// Only the reference check runs; authorization and status are not
    /// consulted.
    pub async fn can_delete(&self, uri: &Uri) -> Result<bool> {
        self.deadline(async {
            self.load(uri).await?;
            self.guard.can_delete(uri).await
        })
        .await
    }

    /// Stored resource by URI or by `openskos:uuid`.
    pub async fn find_by_id(&self, id: &str) -> Result<Resource> {
        self.deadline(async {
            let id = id.trim();
            if is_uuid(id) {
                let uuid = Term::Literal(Literal::plain(id));
                let holder = self
                    .store
                    .subjects_with(&openskos::uuid(), &uuid)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::NotFound(format!("No resource with UUID '{}'", id)))?;
                return self.load(&holder).await;
            }
            self.load(&Uri::parse(id)?).await
        })
        .await
    }

    /// Resources of a type, soft-deleted ones excluded.
    ///
    /// `limit` is capped by [`EngineConfig::max_rows`].
    pub async fn list(&self, kind: ResourceType, limit: Option<usize>) -> Result<Vec<Resource>> {
        let limit = limit
            .unwrap_or(self.config.max_rows)
            .min(self.config.max_rows);
        self.deadline(async {
            let typed = self
                .store
                .find_triples(
                    &TriplePattern::any()
                        .predicate(rdf::type_())
                        .object(kind.type_uri()),
                    Some(limit),
                )
                .await?;
            let mut resources = Vec::with_capacity(typed.len());
            for triple in typed {
                if let Some(resource) = self.store.fetch_resource(&triple.subject).await? {
                    if !ConceptStatus::is_deleted(&resource) {
                        resources.push(resource);
                    }
                }
            }
            debug!(
                subsystem = "engine",
                component = "manager",
                op = "list",
                resource_type = %kind,
                result_count = resources.len(),
                "Listed resources"
            );
            Ok(resources)
        })
        .await
    }

    /// Sets published by a tenant.
    pub async fn sets_for_tenant(&self, tenant_uri: &Uri) -> Result<Vec<Resource>> {
        self.deadline(self.sets.sets_for_tenant(tenant_uri)).await
    }

    /// Custom relation predicates a tenant has registered.
    pub async fn relations_for_tenant(&self, tenant_code: &str) -> Result<Vec<Uri>> {
        self.deadline(async {
            let uri = self
                .tenants
                .code_to_uri(tenant_code)
                .await?
                .ok_or_else(|| {
                    Error::Config(format!("No tenant found with code '{}'", tenant_code))
                })?;
            self.registry
                .registered_for(&TenantContext::new(tenant_code, uri))
                .await
        })
        .await
    }

    // =========================================================================
    // PIPELINE HELPERS
    // =========================================================================

    async fn deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.request_timeout, fut).await {
            Ok(result) => result,
            Err(elapsed) => Err(elapsed.into()),
        }
    }

    /// Run a mutation under the deadline and log its terminal state.
    async fn mutation<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let start = Instant::now();
        debug!(
            subsystem = "engine",
            component = "manager",
            op,
            state = %MutationState::Received,
            "Mutation state"
        );
        let outcome = self.deadline(fut).await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            Ok(_) => info!(
                subsystem = "engine",
                component = "manager",
                op,
                state = %MutationState::Persisted,
                duration_ms,
                "Mutation persisted"
            ),
            Err(e) => warn!(
                subsystem = "engine",
                component = "manager",
                op,
                state = %MutationState::Rejected,
                error_kind = %e.kind(),
                error = %e,
                duration_ms,
                "Mutation rejected"
            ),
        }
        outcome
    }

    async fn resolve_actor(&self, actor_key: &str) -> Result<User> {
        let user = self
            .users
            .by_api_key(actor_key)
            .await?
            .ok_or_else(|| Error::Unauthorized("No such API-key".to_string()))?;
        if !user.is_api_allowed() {
            return Err(Error::Unauthorized(format!(
                "User '{}' is not allowed to use the API",
                user.name
            )));
        }
        if !user.is_active() {
            return Err(Error::Unauthorized(format!("User '{}' is blocked", user.name)));
        }
        Ok(user)
    }

    async fn context(
        &self,
        actor_key: &str,
        tenant_code: &str,
        set_code: Option<&str>,
        status: Option<ConceptStatus>,
    ) -> Result<MutationContext> {
        let actor_key = actor_key.trim();
        let tenant_code = tenant_code.trim();
        if actor_key.is_empty() {
            return Err(Error::InvalidInput("An API key is required".to_string()));
        }
        if tenant_code.is_empty() {
            return Err(Error::InvalidInput("A tenant code is required".to_string()));
        }
        let actor = self.resolve_actor(actor_key).await?;
        MutationContext::resolve(
            actor,
            tenant_code,
            set_code,
            status,
            self.tenants.as_ref(),
            &self.sets,
        )
        .await
    }

    async fn require_valid(
        &self,
        resource: &Resource,
        mode: ValidationMode<'_>,
        tenant: &TenantContext,
    ) -> Result<()> {
        let errors = self.validator.validate(resource, mode, tenant).await?;
        if errors.is_empty() {
            return Ok(());
        }
        Err(Error::InvalidInput(errors.join("; ")))
    }

    async fn relation_guard(&self, needed: bool) -> Option<MutexGuard<'_, ()>> {
        if needed && self.config.serialize_relation_writes {
            Some(self.relation_lock.lock().await)
        } else {
            None
        }
    }

    async fn load(&self, uri: &Uri) -> Result<Resource> {
        self.store
            .fetch_resource(uri)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No resource with URI <{}>", uri)))
    }

    async fn refetch(&self, uri: &Uri) -> Result<Resource> {
        self.store.fetch_resource(uri).await?.ok_or_else(|| {
            Error::Internal(format!("<{}> was written but cannot be read back", uri))
        })
    }
}

fn denied(ctx: &MutationContext, operation: Operation, kind: ResourceType, uri: &Uri) -> Error {
    Error::Unauthorized(format!(
        "User '{}' with role {} may not {} {} <{}> in tenant '{}'",
        ctx.actor.name,
        ctx.actor.role.as_str(),
        operation,
        kind,
        uri,
        ctx.tenant.code
    ))
}
