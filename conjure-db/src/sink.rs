//! Request-log seam for telemetry records.

use async_trait::async_trait;
use conjure_core::{ConnectorResult, RequestRecord};

/// Persists one [`RequestRecord`] per write attempt.
///
/// The storage behind the sink is an external collaborator. The adapter
/// treats `save` as fire-and-forget: a sink error is logged and swallowed,
/// never folded into the write outcome.
#[async_trait]
pub trait RequestSink: Send + Sync {
    async fn save(&self, record: RequestRecord) -> ConnectorResult<()>;
}

/// Sink that emits records as structured tracing events.
///
/// Useful for deployments that scrape logs instead of running a request
/// store, and as a default when no sink is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl RequestSink for LogSink {
    async fn save(&self, record: RequestRecord) -> ConnectorResult<()> {
        tracing::info!(
            project_id = %record.project_id,
            spell = %record.spell,
            node_id = record.node_id,
            provider = %record.provider,
            status_code = record.status_code,
            elapsed_ms = record.elapsed_ms,
            request = %record.request_data,
            "database request"
        );
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use conjure_core::{Invocation, RowPayload, SpellContext, WriteNode, WriteOutcome};
    use std::collections::HashMap;
    use std::time::Duration;

    #[tokio::test]
    async fn test_log_sink_accepts_records() {
        let invocation = Invocation {
            node: WriteNode {
                id: 1,
                table: "users".to_string(),
                on_conflict: "email".to_string(),
            },
            inputs: HashMap::new(),
            context: SpellContext {
                project_id: "p".to_string(),
                spell: "s".to_string(),
                secrets: None,
            },
        };
        let record = RequestRecord::for_upsert(
            &invocation,
            &RowPayload::new(),
            &WriteOutcome::applied(Vec::new()),
            chrono::Utc::now(),
            Duration::ZERO,
        );
        assert!(LogSink.save(record).await.is_ok());
    }
}
