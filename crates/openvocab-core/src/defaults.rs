//! Centralized default constants for openvocab.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration structs in the other crates fall back to these.

// =============================================================================
// PIPELINE
// =============================================================================

/// Upper bound on resources returned by a single list call.
pub const MAX_ROWS: usize = 500;

/// Overall wall-clock budget for one mutation, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Prefix for generated resource URIs.
pub const URI_BASE: &str = "http://openvocab.local/resource/";

/// Status given to a new concept when the request does not choose one.
pub const INITIAL_STATUS: &str = "candidate";

/// Statuses a request may pick for a new concept.
pub const ALLOWED_INITIAL_STATUSES: &[&str] = &["candidate", "approved"];

/// Nodes a single cycle search may visit before giving up.
pub const MAX_TRAVERSAL_NODES: usize = 100_000;

// =============================================================================
// SPARQL
// =============================================================================

/// Default SPARQL query endpoint (Fuseki layout).
pub const SPARQL_QUERY_URL: &str = "http://localhost:3030/openvocab/query";

/// Default SPARQL update endpoint (Fuseki layout).
pub const SPARQL_UPDATE_URL: &str = "http://localhost:3030/openvocab/update";

/// HTTP timeout for one SPARQL round trip, in seconds.
pub const SPARQL_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum pool connections.
pub const POOL_MAX_CONNECTIONS: u32 = 20;

/// Default minimum idle connections.
pub const POOL_MIN_CONNECTIONS: u32 = 2;

/// Connection acquire timeout, in seconds.
pub const POOL_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Idle connection timeout, in seconds.
pub const POOL_IDLE_TIMEOUT_SECS: u64 = 600;

/// Maximum connection lifetime, in seconds.
pub const POOL_MAX_LIFETIME_SECS: u64 = 1800;
