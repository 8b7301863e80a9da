//! Conjure Core - Connector Data Types
//!
//! Pure data structures for the Conjure database connector. This crate
//! carries only the shapes exchanged between the node-graph engine and the
//! write adapter; the adapter itself, the session traits, and the
//! PostgreSQL implementation live in `conjure-db`.

pub mod error;
pub mod invocation;
pub mod outcome;
pub mod request;
pub mod value;

pub use error::{ConnectorError, ConnectorResult};
pub use invocation::{
    Invocation, NodeId, SecretMap, SpellContext, WriteNode, DATA_INPUT, PG_STRING_SECRET,
};
pub use outcome::{RowData, WriteOutcome};
pub use request::{
    RequestRecord, RequestStatus, Timestamp, KIND_TAG, MODEL_TAG, PROVIDER_TAG,
};
pub use value::{RowPayload, SqlValue};
