//! Conjure DB - PostgreSQL Write Adapter
//!
//! One workflow node action: a conflict-resolving upsert against PostgreSQL
//! plus one telemetry record per attempt that reaches the query stage.
//!
//! Modules:
//! - `session`: the session and factory seams the adapter writes through.
//! - `sink`: the request-log seam telemetry records are handed to.
//! - `pg`: per-invocation tokio-postgres session implementation.
//! - `sql` / `binding` / `row`: statement construction, parameter binding
//!   against server-reported types, and RETURNING-row decoding.
//! - `adapter`: the `WriteAdapter` orchestrating one call end to end.
//! - `mock`: in-memory session factory and sinks for tests.

pub mod adapter;
pub mod binding;
pub mod mock;
pub mod pg;
pub mod row;
pub mod session;
pub mod sink;
pub mod sql;

pub use adapter::WriteAdapter;
pub use mock::{FailingSink, MockSessionFactory, RecordingSink, UpsertCall};
pub use pg::{PgSession, PgSessionFactory};
pub use session::{SessionFactory, WriteSession};
pub use sink::{LogSink, RequestSink};

// Re-export the core types callers need alongside the adapter.
pub use conjure_core::{
    ConnectorError, ConnectorResult, Invocation, NodeId, RequestRecord, RequestStatus, RowData,
    RowPayload, SecretMap, SpellContext, SqlValue, WriteNode, WriteOutcome,
};
