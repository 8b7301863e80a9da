//! Outcome classification for a single write attempt.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::Display;

/// One returned row, decoded column-by-column into plain JSON values.
pub type RowData = BTreeMap<String, JsonValue>;

/// Result of one conflict-resolving write.
///
/// The underlying client historically reported failures through two
/// channels (an error-valued result and a raised error); this type
/// normalizes both into a single tagged variant so callers branch on one
/// representation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The statement ran; `rows` holds the RETURNING set. An empty set is
    /// still a success: classification keys on the absence of an error,
    /// not the row count.
    Applied { rows: Vec<RowData> },
    /// The statement failed; the message is safe to surface to the engine.
    Failed { error: String },
}

impl WriteOutcome {
    pub fn applied(rows: Vec<RowData>) -> Self {
        Self::Applied { rows }
    }

    pub fn failed(error: impl Display) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Returned rows, when the write succeeded.
    pub fn rows(&self) -> Option<&[RowData]> {
        match self {
            Self::Applied { rows } => Some(rows),
            Self::Failed { .. } => None,
        }
    }

    /// Failure message, when the write failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Applied { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// Serializes to the engine contract: `{"success": bool, "result": rows}`
/// on success, `{"success": false, "error": message}` on failure.
impl Serialize for WriteOutcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("WriteOutcome", 2)?;
        match self {
            Self::Applied { rows } => {
                state.serialize_field("success", &true)?;
                state.serialize_field("result", rows)?;
            }
            Self::Failed { error } => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_applied_serializes_to_engine_shape() {
        let mut row = RowData::new();
        row.insert("email".to_string(), json!("a@x.com"));
        row.insert("name".to_string(), json!("Ann"));
        let outcome = WriteOutcome::applied(vec![row]);

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "result": [{"email": "a@x.com", "name": "Ann"}]})
        );
    }

    #[test]
    fn test_failed_serializes_to_engine_shape() {
        let outcome = WriteOutcome::failed("relation \"users\" does not exist");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "error": "relation \"users\" does not exist"})
        );
    }

    #[test]
    fn test_empty_row_set_is_success() {
        let outcome = WriteOutcome::applied(Vec::new());
        assert!(outcome.is_success());
        assert_eq!(outcome.rows(), Some(&[][..]));
        assert_eq!(outcome.error(), None);
    }
}
