//! Invocation record delivered by the node-graph engine for one write.

use crate::error::{ConnectorError, ConnectorResult};
use crate::value::RowPayload;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;

/// Secret key that resolves the PostgreSQL connection string.
pub const PG_STRING_SECRET: &str = "pg_string";

/// Runtime input slot that carries the row payload.
pub const DATA_INPUT: &str = "data";

/// Numeric node identifier assigned by the engine.
pub type NodeId = i64;

/// Per-project secret material resolved by the engine before dispatch.
/// Values stay wrapped in [`SecretString`] so they never leak through
/// Debug output or telemetry.
pub type SecretMap = HashMap<String, SecretString>;

/// Static configuration of a write node.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteNode {
    pub id: NodeId,
    /// Target table.
    pub table: String,
    /// Conflict column that routes an insert onto the merge path.
    pub on_conflict: String,
}

/// Execution context threaded through by the engine.
#[derive(Debug, Deserialize)]
pub struct SpellContext {
    pub project_id: String,
    /// Identifier of the enclosing spell (workflow definition).
    pub spell: String,
    /// Secret material; `None` when the deployment never provisioned any.
    pub secrets: Option<SecretMap>,
}

impl SpellContext {
    /// Look up one secret by key.
    ///
    /// An absent secret map is a configuration-tier error
    /// ([`ConnectorError::SecretsUnavailable`]); an absent key within a
    /// present map is an ordinary handled failure.
    pub fn secret(&self, key: &str) -> ConnectorResult<&SecretString> {
        let secrets = self
            .secrets
            .as_ref()
            .ok_or_else(|| ConnectorError::SecretsUnavailable {
                project_id: self.project_id.clone(),
            })?;
        secrets.get(key).ok_or_else(|| ConnectorError::SecretMissing {
            key: key.to_string(),
        })
    }
}

/// Full set of inputs delivered to the connector for one call.
#[derive(Debug, Deserialize)]
pub struct Invocation {
    pub node: WriteNode,
    /// Named runtime inputs; the row payload arrives under [`DATA_INPUT`].
    pub inputs: HashMap<String, RowPayload>,
    pub context: SpellContext,
}

impl Invocation {
    /// The row payload wired into the data input.
    pub fn payload(&self) -> ConnectorResult<&RowPayload> {
        self.inputs
            .get(DATA_INPUT)
            .ok_or_else(|| ConnectorError::InputMissing {
                name: DATA_INPUT.to_string(),
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================
