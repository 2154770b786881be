//! Server-side stamping of submitted resources.
//!
//! The preprocessor never edits the caller's resource; it returns a stamped
//! copy so the submission stays available for diagnostics.
//!
//! Stamped on creation:
//!
//! | Predicate              | Value                                     |
//! |------------------------|-------------------------------------------|
//! | `openskos:uuid`        | resolved identity                         |
//! | `dcterms:creator`      | acting user, unless supplied              |
//! | `dcterms:dateSubmitted`| request time                              |
//! | `openskos:tenant`      | request tenant (not on tenant resources)  |
//! | `openskos:set`         | request set, when one was named           |
//! | `openskos:status`      | concepts only; requested or `candidate`   |
//! | `dcterms:publisher`    | sets only; request tenant, unless supplied|
//!
//! Stamped on update: `dcterms:modified`, `openskos:modifiedBy`, plus every
//! immutable property the submission omitted, copied from the stored version.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use openvocab_core::namespaces::{dcterms, openskos, xsd};
use openvocab_core::{
    ConceptStatus, Error, Literal, Resource, ResourceType, Result, TenantContext, TenantResolver,
    Term, TypeSpec, Uri, User,
};

use crate::identity::ResolvedIdentity;
use crate::tenants::SetResolver;

/// Who is acting, on whose behalf, and with which request parameters.
#[derive(Debug, Clone)]
pub struct MutationContext {
    pub actor: User,
    pub tenant: TenantContext,
    /// Set named by the request, already resolved.
    pub set: Option<Uri>,
    /// Initial status explicitly requested for a new concept.
    pub requested_status: Option<ConceptStatus>,
    pub now: DateTime<Utc>,
}

impl MutationContext {
    /// Resolve tenant and set codes into a context.
    ///
    /// Unknown codes are configuration errors: the caller named something the
    /// deployment does not know about.
    pub async fn resolve(
        actor: User,
        tenant_code: &str,
        set_code: Option<&str>,
        requested_status: Option<ConceptStatus>,
        tenants: &dyn TenantResolver,
        sets: &SetResolver,
    ) -> Result<Self> {
        let tenant_uri = tenants.code_to_uri(tenant_code).await?.ok_or_else(|| {
            Error::Config(format!("No tenant found with code '{}'", tenant_code))
        })?;
        let tenant = TenantContext::new(tenant_code, tenant_uri);

        let set = match set_code {
            Some(code) => Some(sets.resolve(code, &tenant).await?.ok_or_else(|| {
                Error::Config(format!(
                    "No set found with code '{}' in tenant '{}'",
                    code, tenant.code
                ))
            })?),
            None => None,
        };

        Ok(Self {
            actor,
            tenant,
            set,
            requested_status,
            now: Utc::now(),
        })
    }

    /// Request time as an `xsd:dateTime` literal.
    pub fn timestamp(&self) -> Term {
        Term::Literal(Literal::typed(
            self.now.to_rfc3339_opts(SecondsFormat::Secs, true),
            xsd::date_time(),
        ))
    }
}

/// Kinds that carry tenant-scoped set membership.
fn takes_set(kind: ResourceType) -> bool {
    matches!(
        kind,
        ResourceType::Concept | ResourceType::ConceptScheme | ResourceType::SkosCollection
    )
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    allowed_initial_statuses: Vec<ConceptStatus>,
}

impl Preprocessor {
    pub fn new(allowed_initial_statuses: Vec<ConceptStatus>) -> Self {
        Self {
            allowed_initial_statuses,
        }
    }

    /// Stamp a resource about to be created.
    pub fn for_creation(
        &self,
        resource: &Resource,
        identity: &ResolvedIdentity,
        spec: &TypeSpec,
        ctx: &MutationContext,
    ) -> Result<Resource> {
        let mut out = resource.clone();
        out.uri = Some(identity.uri.clone());
        out.set_property(
            openskos::uuid(),
            vec![Term::Literal(Literal::plain(identity.uuid.as_str()))],
        );

        if !out.has_property(&dcterms::creator()) {
            out.set_property(dcterms::creator(), vec![Term::uri(ctx.actor.uri.clone())]);
        }
        out.set_property(dcterms::date_submitted(), vec![ctx.timestamp()]);

        if spec.kind != ResourceType::Tenant {
            out.set_property(openskos::tenant(), vec![Term::uri(ctx.tenant.uri.clone())]);
        }
        if spec.kind == ResourceType::Set && !out.has_property(&dcterms::publisher()) {
            out.set_property(dcterms::publisher(), vec![Term::uri(ctx.tenant.uri.clone())]);
        }
        if let (Some(set), true) = (&ctx.set, takes_set(spec.kind)) {
            out.set_property(openskos::set(), vec![Term::uri(set.clone())]);
        }

        if spec.kind.is_concept() {
            let status = match ctx.requested_status {
                Some(status) => status,
                None => ConceptStatus::of(resource)?.unwrap_or(ConceptStatus::Candidate),
            };
            if !self.allowed_initial_statuses.contains(&status) {
                return Err(Error::InvalidInput(format!(
                    "Status '{}' is not allowed for a new concept",
                    status
                )));
            }
            out.set_property(openskos::status(), vec![status.to_term()]);
        }

        debug!(
            subsystem = "engine",
            component = "preprocess",
            resource_uri = %identity.uri,
            resource_type = %spec.kind,
            tenant = %ctx.tenant.code,
            "Stamped resource for creation"
        );
        Ok(out)
    }

    /// Stamp a resource about to replace `stored`.
    pub fn for_update(
        &self,
        resource: &Resource,
        stored: &Resource,
        spec: &TypeSpec,
        ctx: &MutationContext,
    ) -> Result<Resource> {
        let mut out = resource.clone();

        for predicate in &spec.immutable_properties {
            if !out.has_property(predicate) && stored.has_property(predicate) {
                out.set_property(predicate.clone(), stored.property(predicate).to_vec());
            }
        }
        // Stamps owned by the server survive an update that leaves them out.
        for predicate in [openskos::tenant(), openskos::set(), dcterms::date_submitted()] {
            if !out.has_property(&predicate) && stored.has_property(&predicate) {
                out.set_property(predicate.clone(), stored.property(&predicate).to_vec());
            }
        }
        if let (Some(set), true) = (&ctx.set, takes_set(spec.kind)) {
            out.set_property(openskos::set(), vec![Term::uri(set.clone())]);
        }

        if spec.kind.is_concept() && !out.has_property(&openskos::status()) {
            out.set_property(openskos::status(), stored.property(&openskos::status()).to_vec());
        }

        out.set_property(dcterms::modified(), vec![ctx.timestamp()]);
        out.set_property(
            openskos::modified_by(),
            vec![Term::uri(ctx.actor.uri.clone())],
        );

        debug!(
            subsystem = "engine",
            component = "preprocess",
            resource_uri = ?out.uri.as_ref().map(|u| u.as_str()),
            resource_type = %spec.kind,
            tenant = %ctx.tenant.code,
            "Stamped resource for update"
        );
        Ok(out)
    }
}
