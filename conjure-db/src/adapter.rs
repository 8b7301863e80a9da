//! The write adapter: one conflict-resolving upsert per invocation.

use crate::pg::PgSessionFactory;
use crate::session::SessionFactory;
use crate::sink::RequestSink;
use chrono::Utc;
use conjure_core::{
    ConnectorError, ConnectorResult, Invocation, RequestRecord, WriteOutcome, PG_STRING_SECRET,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Instant;

/// Executes the database write node.
///
/// Holds its collaborators (session factory, telemetry sink) explicitly
/// instead of reaching into an ambient engine context, so tests can
/// substitute both seams.
pub struct WriteAdapter {
    sessions: Arc<dyn SessionFactory>,
    sink: Arc<dyn RequestSink>,
}

impl WriteAdapter {
    pub fn new(sessions: Arc<dyn SessionFactory>, sink: Arc<dyn RequestSink>) -> Self {
        Self { sessions, sink }
    }

    /// Adapter backed by per-invocation tokio-postgres sessions.
    pub fn postgres(sink: Arc<dyn RequestSink>) -> Self {
        Self::new(Arc::new(PgSessionFactory), sink)
    }

    /// Run one upsert.
    ///
    /// An absent secret map is a configuration defect and propagates as
    /// `Err`. Every later failure (missing key or input, connection,
    /// query) is logged and folded into `Ok(WriteOutcome::Failed)` so the
    /// engine can branch without crashing. One telemetry record is emitted
    /// for every attempt that reaches the query stage, and an opened
    /// session is closed exactly once on every path.
    pub async fn execute(&self, invocation: &Invocation) -> ConnectorResult<WriteOutcome> {
        let node = &invocation.node;

        let pg_string = match invocation.context.secret(PG_STRING_SECRET) {
            Ok(secret) => secret,
            Err(e @ ConnectorError::SecretsUnavailable { .. }) => return Err(e),
            Err(e) => {
                tracing::error!(error = %e, node_id = node.id, "connection string unavailable");
                return Ok(WriteOutcome::failed(e));
            }
        };

        let payload = match invocation.payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, node_id = node.id, "write payload unavailable");
                return Ok(WriteOutcome::failed(e));
            }
        };
        if payload.is_empty() {
            let e = ConnectorError::EmptyPayload {
                table: node.table.clone(),
            };
            tracing::error!(error = %e, node_id = node.id, "write payload has no columns");
            return Ok(WriteOutcome::failed(e));
        }

        let mut session = match self.sessions.open(pg_string.expose_secret()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, table = %node.table, node_id = node.id, "session open failed");
                return Ok(WriteOutcome::failed(e));
            }
        };

        // No early return below this point: the session must close exactly
        // once, after telemetry.
        let started_at = Utc::now();
        let started = Instant::now();
        let result = session.upsert(&node.table, &node.on_conflict, payload).await;

        let outcome = match result {
            Ok(rows) => WriteOutcome::applied(rows),
            Err(e) => {
                tracing::error!(error = %e, table = %node.table, node_id = node.id, "upsert failed");
                WriteOutcome::failed(e)
            }
        };

        let record =
            RequestRecord::for_upsert(invocation, payload, &outcome, started_at, started.elapsed());
        if let Err(e) = self.sink.save(record).await {
            tracing::warn!(error = %e, node_id = node.id, "telemetry sink rejected request record");
        }

        session.close().await;

        Ok(outcome)
    }
}
