//! # openvocab-sparql
//!
//! SPARQL 1.1 Protocol client implementing the openvocab triple store
//! contract, for deployments whose system of record is an RDF store such as
//! Jena Fuseki.

pub mod client;
pub mod config;
pub mod query;
pub mod results;

pub use client::SparqlTripleStore;
pub use config::{ConfigError, SparqlConfig};
