//! # openvocab-engine
//!
//! The resource mutation pipeline and relation integrity engine.
//!
//! [`ResourceManager`] is the entry point. It runs each create, update,
//! delete and single-edge operation through identity resolution,
//! preprocessing, structural validation, relation integrity checks and
//! authorization before anything reaches the [`openvocab_core::TripleStore`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use openvocab_core::{MemoryTripleStore, MemoryUserStore, TripleStore};
//! use openvocab_engine::{EngineConfig, GraphTenantResolver, ResourceManager};
//!
//! let store: Arc<dyn TripleStore> = Arc::new(MemoryTripleStore::new());
//! let manager = ResourceManager::new(
//!     store.clone(),
//!     Arc::new(MemoryUserStore::new()),
//!     Arc::new(GraphTenantResolver::new(store)),
//!     EngineConfig::default(),
//! )
//! .expect("valid configuration");
//! ```

pub mod authorization;
pub mod config;
pub mod deletion;
pub mod identity;
pub mod manager;
pub mod preprocess;
pub mod registry;
pub mod relations;
pub mod tenants;
pub mod validation;

pub use authorization::{AuthorizationGate, Operation};
pub use config::EngineConfig;
pub use deletion::DeletionGuard;
pub use identity::{IdentityResolver, ResolvedIdentity};
pub use manager::{CreateOptions, MutationState, ResourceManager, UpdateOptions};
pub use preprocess::{MutationContext, Preprocessor};
pub use registry::RelationRegistry;
pub use relations::{classify, RelationIntegrityChecker, RelationKind};
pub use tenants::{GraphTenantResolver, SetResolver, StaticTenantResolver};
pub use validation::{ResourceValidator, ValidationMode};
