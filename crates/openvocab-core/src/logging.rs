//! Structured logging schema and field name constants for openvocab.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Store misbehaving, requires operator attention |
//! | WARN  | Rejected mutation, recoverable store issue |
//! | INFO  | Lifecycle events, completed mutations |
//! | DEBUG | Pipeline state transitions, decision points |
//! | TRACE | Per-edge traversal, per-triple store traffic |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "engine", "db", "sparql", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "manager", "relations", "pool", "client"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "update", "delete", "add_relation_edge"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// URI of the resource being mutated.
pub const RESOURCE_URI: &str = "resource_uri";

/// Resource type (`concept`, `set`, ...).
pub const RESOURCE_TYPE: &str = "resource_type";

/// Tenant code of the request.
pub const TENANT: &str = "tenant";

/// Name of the acting user.
pub const ACTOR: &str = "actor";

/// Relation predicate URI.
pub const PREDICATE: &str = "predicate";

/// Relation object URI.
pub const OBJECT_URI: &str = "object_uri";

// ─── Pipeline fields ───────────────────────────────────────────────────────

/// Mutation state reached (`identifier_resolved`, `validated`, ...).
pub const STATE: &str = "state";

/// Error kind of a rejected mutation.
pub const ERROR_KIND: &str = "error_kind";

/// Nodes visited by a cycle search.
pub const VISITED: &str = "visited";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of triples read or written.
pub const TRIPLE_COUNT: &str = "triple_count";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
