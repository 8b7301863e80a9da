//! Session seams between the write adapter and the SQL client.
//!
//! The adapter never talks to a client library directly: it opens a
//! [`WriteSession`] through a [`SessionFactory`], runs exactly one upsert,
//! and closes the session. Tests substitute the mock implementations from
//! [`crate::mock`]; production uses [`crate::pg`].

use async_trait::async_trait;
use conjure_core::{ConnectorResult, RowData, RowPayload};

/// One short-lived connection, exclusively owned by a single invocation.
#[async_trait]
pub trait WriteSession: Send {
    /// Insert `payload` into `table`; on a uniqueness conflict on the
    /// `on_conflict` column, merge the payload columns into the existing
    /// row (last write wins) and return the full affected rows.
    async fn upsert(
        &mut self,
        table: &str,
        on_conflict: &str,
        payload: &RowPayload,
    ) -> ConnectorResult<Vec<RowData>>;

    /// Release the connection. Called exactly once per session, on every
    /// exit path of the adapter.
    async fn close(&mut self);
}

/// Opens sessions from a caller-supplied connection string.
///
/// The factory holds no pooled state: every invocation resolves its own
/// connection string from project secrets, so pooling (if any) belongs to
/// the client library behind the session.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a session against the given connection string.
    async fn open(&self, conn_str: &str) -> ConnectorResult<Box<dyn WriteSession>>;
}
