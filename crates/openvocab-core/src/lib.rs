//! # openvocab-core
//!
//! Core types, traits, and abstractions for openvocab.
//!
//! This crate provides the RDF resource model, the resource-type table, the
//! error taxonomy and the collaborator traits the mutation pipeline consumes.

pub mod defaults;
pub mod env;
pub mod error;
pub mod logging;
pub mod memory;
pub mod namespaces;
pub mod ntriples;
pub mod rdf;
pub mod status;
pub mod tenant;
pub mod traits;
pub mod types;
pub mod user;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};
pub use memory::{MemoryTripleStore, MemoryUserStore};
pub use namespaces::StandardNamespaces;
pub use ntriples::NTriplesCodec;
pub use rdf::{Literal, Resource, Term, Triple, Uri};
pub use status::ConceptStatus;
pub use tenant::TenantContext;
pub use traits::*;
pub use types::{DeletionPolicy, ResourceType, ResourceTypeRegistry, TypeSpec};
pub use user::{Role, User};
pub use uuid_utils::new_v7;
