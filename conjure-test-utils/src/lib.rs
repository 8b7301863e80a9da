//! Conjure Test Utilities
//!
//! Centralized test infrastructure for the connector workspace:
//! - Fixtures for invocations, payloads, and rows
//! - Proptest generators for payload values and identifiers
//! - Re-exported mock seams from `conjure-db`

// Re-export the mock seams from their source crate
pub use conjure_db::{FailingSink, MockSessionFactory, RecordingSink, UpsertCall};

// Re-export core types for convenience
pub use conjure_core::{
    ConnectorError, ConnectorResult, Invocation, NodeId, RequestRecord, RequestStatus, RowData,
    RowPayload, SecretMap, SpellContext, SqlValue, WriteNode, WriteOutcome, DATA_INPUT,
    PG_STRING_SECRET,
};

use secrecy::SecretString;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

// ============================================================================
// FIXTURES
// ============================================================================

/// Connection string used by fixture secrets.
pub const FIXTURE_PG_STRING: &str = "postgres://app@localhost/app";

/// A secret map holding only the fixture connection string.
pub fn fixture_secrets() -> SecretMap {
    let mut secrets = SecretMap::new();
    secrets.insert(
        PG_STRING_SECRET.to_string(),
        SecretString::from(FIXTURE_PG_STRING),
    );
    secrets
}

/// Build a payload from column/value pairs.
pub fn payload_of(pairs: &[(&str, SqlValue)]) -> RowPayload {
    pairs
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

/// Build a returned row from column/value pairs.
pub fn row_of(pairs: &[(&str, JsonValue)]) -> RowData {
    pairs
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

/// A complete invocation for one upsert, with fixture context and secrets.
pub fn upsert_invocation(table: &str, on_conflict: &str, data: RowPayload) -> Invocation {
    let mut inputs = HashMap::new();
    inputs.insert(DATA_INPUT.to_string(), data);

    Invocation {
        node: WriteNode {
            id: 1,
            table: table.to_string(),
            on_conflict: on_conflict.to_string(),
        },
        inputs,
        context: SpellContext {
            project_id: "test-project".to_string(),
            spell: "test-spell".to_string(),
            secrets: Some(fixture_secrets()),
        },
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for connector payloads and identifiers.

    use super::*;
    use proptest::collection::btree_map;
    use proptest::prelude::*;

    /// SQL identifiers, including ones that need quoting.
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_ \"]{0,20}"
    }

    /// Any payload value with a JSON-representable float range.
    pub fn arb_sql_value() -> impl Strategy<Value = SqlValue> {
        prop_oneof![
            Just(SqlValue::Null),
            any::<bool>().prop_map(SqlValue::Bool),
            any::<i64>().prop_map(SqlValue::Integer),
            (-1e12f64..1e12f64).prop_map(SqlValue::Float),
            "[a-zA-Z0-9 @._-]{0,24}".prop_map(SqlValue::Text),
        ]
    }

    /// Non-empty payloads keyed by generated identifiers.
    pub fn arb_payload() -> impl Strategy<Value = RowPayload> {
        btree_map(arb_identifier(), arb_sql_value(), 1..8)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use conjure_db::WriteAdapter;
    use serde_json::json;

    #[test]
    fn test_fixture_invocation_resolves_its_own_pieces() {
        let invocation = upsert_invocation(
            "users",
            "email",
            payload_of(&[("email", SqlValue::from("a@x.com"))]),
        );
        assert!(invocation.context.secret(PG_STRING_SECRET).is_ok());
        assert_eq!(invocation.payload().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fixtures_drive_the_adapter_end_to_end() {
        let factory = MockSessionFactory::returning(vec![row_of(&[("email", json!("a@x.com"))])]);
        let sink = RecordingSink::new();
        let adapter = WriteAdapter::new(factory.clone(), sink.clone());

        let outcome = adapter
            .execute(&upsert_invocation(
                "users",
                "email",
                payload_of(&[("email", SqlValue::from("a@x.com"))]),
            ))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(sink.records().len(), 1);
        assert_eq!(factory.close_count(), 1);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::generators::*;
    use conjure_db::sql::{quote_ident, upsert_statement};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_statement_quotes_every_payload_column(payload in arb_payload()) {
            let columns: Vec<&str> = payload.keys().map(String::as_str).collect();
            let statement = upsert_statement("t", columns[0], &columns);
            for column in &columns {
                prop_assert!(statement.contains(&quote_ident(column)));
            }
            prop_assert!(statement.ends_with("RETURNING *"));
        }
    }
}
