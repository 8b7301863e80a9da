//! Telemetry record persisted for every write attempt that reaches the
//! query stage, success or failure.

use crate::invocation::{Invocation, NodeId};
use crate::outcome::{RowData, WriteOutcome};
use crate::value::{payload_to_json, RowPayload};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

/// Wall-clock timestamp type used across the connector.
pub type Timestamp = DateTime<Utc>;

/// Client tag recorded in the `model` field: the library that drove the write.
pub const MODEL_TAG: &str = "tokio-postgres";

/// Provider tag for the relational store.
pub const PROVIDER_TAG: &str = "postgres";

/// Request category recorded in the `type` field.
pub const KIND_TAG: &str = "database";

/// Status label mirrored by `status_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Error")]
    Error,
}

impl RequestStatus {
    /// The HTTP-like code paired with this label.
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Error => 500,
        }
    }
}

/// Audit entry describing one write attempt.
///
/// Persisted by an external request-log sink; the connector only assembles
/// the record and hands it over.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub project_id: String,
    /// JSON document: target table plus the submitted updates.
    pub request_data: String,
    /// JSON array of returned rows; absent when the write failed.
    pub response_data: Option<String>,
    pub started_at: Timestamp,
    /// Elapsed time from the monotonic start recorded just before the query.
    pub elapsed_ms: u64,
    pub status_code: u16,
    pub status: RequestStatus,
    pub model: String,
    /// Duplicate of `request_data`, kept for sink-side query parity.
    pub parameters: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: String,
    /// Always `None`: database writes carry no token usage.
    pub total_tokens: Option<i64>,
    pub hidden: bool,
    pub processed: bool,
    /// Identifier of the enclosing spell.
    pub spell: String,
    pub node_id: NodeId,
}

impl RequestRecord {
    /// Assemble the record for one upsert attempt.
    pub fn for_upsert(
        invocation: &Invocation,
        payload: &RowPayload,
        outcome: &WriteOutcome,
        started_at: Timestamp,
        elapsed: Duration,
    ) -> Self {
        let request_data = json!({
            "table": invocation.node.table,
            "updates": payload_to_json(payload),
        })
        .to_string();
        let status = if outcome.is_success() {
            RequestStatus::Ok
        } else {
            RequestStatus::Error
        };

        Self {
            project_id: invocation.context.project_id.clone(),
            response_data: outcome.rows().map(rows_to_json_string),
            started_at,
            elapsed_ms: elapsed.as_millis() as u64,
            status_code: status.code(),
            status,
            model: MODEL_TAG.to_string(),
            parameters: request_data.clone(),
            request_data,
            kind: KIND_TAG.to_string(),
            provider: PROVIDER_TAG.to_string(),
            total_tokens: None,
            hidden: false,
            processed: false,
            spell: invocation.context.spell.clone(),
            node_id: invocation.node.id,
        }
    }
}

fn rows_to_json_string(rows: &[RowData]) -> String {
    JsonValue::Array(
        rows.iter()
            .map(|row| JsonValue::Object(row.clone().into_iter().collect()))
            .collect(),
    )
    .to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{SpellContext, WriteNode};
    use crate::value::SqlValue;
    use serde_json::json;
    use std::collections::HashMap;

    fn invocation() -> Invocation {
        Invocation {
            node: WriteNode {
                id: 42,
                table: "users".to_string(),
                on_conflict: "email".to_string(),
            },
            inputs: HashMap::new(),
            context: SpellContext {
                project_id: "proj-1".to_string(),
                spell: "spell-1".to_string(),
                secrets: None,
            },
        }
    }

    fn payload() -> RowPayload {
        [
            ("email".to_string(), SqlValue::from("a@x.com")),
            ("name".to_string(), SqlValue::from("Ann")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_success_record_fields() {
        let mut row = RowData::new();
        row.insert("email".to_string(), json!("a@x.com"));
        let outcome = WriteOutcome::applied(vec![row]);

        let record = RequestRecord::for_upsert(
            &invocation(),
            &payload(),
            &outcome,
            Utc::now(),
            Duration::from_millis(12),
        );

        assert_eq!(record.status, RequestStatus::Ok);
        assert_eq!(record.status_code, 200);
        assert_eq!(record.project_id, "proj-1");
        assert_eq!(record.spell, "spell-1");
        assert_eq!(record.node_id, 42);
        assert_eq!(record.model, MODEL_TAG);
        assert_eq!(record.provider, PROVIDER_TAG);
        assert_eq!(record.kind, KIND_TAG);
        assert_eq!(record.total_tokens, None);
        assert!(!record.hidden);
        assert!(!record.processed);
        assert_eq!(record.elapsed_ms, 12);
        assert_eq!(record.parameters, record.request_data);

        let request: JsonValue = serde_json::from_str(&record.request_data).unwrap();
        assert_eq!(
            request,
            json!({"table": "users", "updates": {"email": "a@x.com", "name": "Ann"}})
        );
        let response: JsonValue =
            serde_json::from_str(record.response_data.as_deref().unwrap()).unwrap();
        assert_eq!(response, json!([{"email": "a@x.com"}]));
    }

    #[test]
    fn test_failure_record_fields() {
        let outcome = WriteOutcome::failed("connection refused");
        let record = RequestRecord::for_upsert(
            &invocation(),
            &payload(),
            &outcome,
            Utc::now(),
            Duration::from_millis(3),
        );

        assert_eq!(record.status, RequestStatus::Error);
        assert_eq!(record.status_code, 500);
        assert_eq!(record.response_data, None);
    }

    #[test]
    fn test_empty_row_set_still_reports_ok() {
        let outcome = WriteOutcome::applied(Vec::new());
        let record = RequestRecord::for_upsert(
            &invocation(),
            &payload(),
            &outcome,
            Utc::now(),
            Duration::ZERO,
        );
        assert_eq!(record.status_code, 200);
        assert_eq!(record.response_data.as_deref(), Some("[]"));
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let record = RequestRecord::for_upsert(
            &invocation(),
            &payload(),
            &WriteOutcome::applied(Vec::new()),
            Utc::now(),
            Duration::ZERO,
        );
        let rendered = serde_json::to_value(&record).unwrap();
        assert_eq!(rendered["type"], json!("database"));
        assert_eq!(rendered["status"], json!("OK"));
    }
}
