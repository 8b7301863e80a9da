//! Tagged payload values for column writes.
//!
//! The engine hands row payloads over as plain JSON objects. The untagged
//! representation keeps that wire shape while giving the connector an
//! explicit tag per value to drive parameter binding.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A single column value carried by a write payload.
///
/// Variant order matters for deserialization: integers are tried before
/// floats, and `Json` is the catch-all for arrays and objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Boolean column value.
    Bool(bool),
    /// Integer column value.
    Integer(i64),
    /// Floating-point column value.
    Float(f64),
    /// Text column value; also the carrier for UUID and timestamp columns.
    Text(String),
    /// Structured value bound to JSON/JSONB columns.
    Json(JsonValue),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Short tag used in bind error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Integer(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Json(_) => "json",
        }
    }

    /// The plain JSON rendition of this value.
    pub fn to_json(&self) -> JsonValue {
        match self {
            SqlValue::Null => JsonValue::Null,
            SqlValue::Bool(b) => JsonValue::Bool(*b),
            SqlValue::Integer(i) => JsonValue::from(*i),
            SqlValue::Float(f) => {
                serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number)
            }
            SqlValue::Text(s) => JsonValue::String(s.clone()),
            SqlValue::Json(v) => v.clone(),
        }
    }
}

impl From<JsonValue> for SqlValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => SqlValue::Null,
            JsonValue::Bool(b) => SqlValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => SqlValue::Text(s),
            other => SqlValue::Json(other),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

/// One row of column writes, ordered by column name so that statement
/// construction and binding see a deterministic column sequence.
pub type RowPayload = BTreeMap<String, SqlValue>;

/// Render a payload as the JSON object the engine submitted.
pub fn payload_to_json(payload: &RowPayload) -> JsonValue {
    JsonValue::Object(
        payload
            .iter()
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect(),
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_deserializes_from_plain_object() {
        let payload: RowPayload = serde_json::from_value(json!({
            "email": "a@x.com",
            "age": 30,
            "score": 1.5,
            "active": true,
            "meta": {"tags": ["a"]},
            "deleted_at": null,
        }))
        .unwrap();

        assert_eq!(payload["email"], SqlValue::Text("a@x.com".to_string()));
        assert_eq!(payload["age"], SqlValue::Integer(30));
        assert_eq!(payload["score"], SqlValue::Float(1.5));
        assert_eq!(payload["active"], SqlValue::Bool(true));
        assert_eq!(payload["meta"], SqlValue::Json(json!({"tags": ["a"]})));
        assert_eq!(payload["deleted_at"], SqlValue::Null);
    }

    #[test]
    fn test_payload_iterates_in_column_order() {
        let payload: RowPayload = serde_json::from_value(json!({
            "zeta": 1, "alpha": 2, "mid": 3,
        }))
        .unwrap();
        let columns: Vec<&str> = payload.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_untagged_serialization_is_plain_json() {
        let payload: RowPayload = [
            ("name".to_string(), SqlValue::from("Ann")),
            ("age".to_string(), SqlValue::from(30i64)),
            ("gone".to_string(), SqlValue::Null),
        ]
        .into_iter()
        .collect();

        let rendered = serde_json::to_value(&payload).unwrap();
        assert_eq!(rendered, json!({"age": 30, "gone": null, "name": "Ann"}));
    }

    #[test]
    fn test_from_json_value_tags_numbers() {
        assert_eq!(SqlValue::from(json!(42)), SqlValue::Integer(42));
        assert_eq!(SqlValue::from(json!(4.25)), SqlValue::Float(4.25));
        assert_eq!(SqlValue::from(json!([1, 2])), SqlValue::Json(json!([1, 2])));
    }

    #[test]
    fn test_to_json_roundtrip() {
        for value in [
            SqlValue::Null,
            SqlValue::Bool(false),
            SqlValue::Integer(-7),
            SqlValue::Float(2.5),
            SqlValue::from("text"),
            SqlValue::Json(json!({"k": [true, null]})),
        ] {
            assert_eq!(SqlValue::from(value.to_json()), value);
        }
    }

    #[test]
    fn test_payload_to_json_matches_wire_shape() {
        let payload: RowPayload = [
            ("email".to_string(), SqlValue::from("a@x.com")),
            ("name".to_string(), SqlValue::from("Ann")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            payload_to_json(&payload),
            json!({"email": "a@x.com", "name": "Ann"})
        );
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = SqlValue> {
        prop_oneof![
            Just(SqlValue::Null),
            any::<bool>().prop_map(SqlValue::Bool),
            any::<i64>().prop_map(SqlValue::Integer),
            // Finite floats only: NaN never round-trips through JSON.
            (-1e12f64..1e12f64).prop_map(SqlValue::Float),
            "[a-zA-Z0-9 @._-]{0,24}".prop_map(SqlValue::Text),
        ]
    }

    proptest! {
        #[test]
        fn prop_to_json_preserves_tag(value in arb_value()) {
            prop_assert_eq!(SqlValue::from(value.to_json()), value);
        }

        #[test]
        fn prop_serde_roundtrip(value in arb_value()) {
            let text = serde_json::to_string(&value).unwrap();
            let back: SqlValue = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(back, value);
        }
    }
}
