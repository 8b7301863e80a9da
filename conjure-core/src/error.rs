//! Error types for connector operations

use std::fmt::Display;
use thiserror::Error;

/// Connector errors, split into two tiers: [`ConnectorError::SecretsUnavailable`]
/// signals a deployment defect and propagates to the caller; every other
/// variant is caught by the write adapter and reported as a failed outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("No secrets provisioned for project {project_id}")]
    SecretsUnavailable { project_id: String },

    #[error("Secret not found: {key}")]
    SecretMissing { key: String },

    #[error("Required input missing: {name}")]
    InputMissing { name: String },

    #[error("Empty payload for table {table}")]
    EmptyPayload { table: String },

    #[error("Connection failed: {reason}")]
    ConnectFailed { reason: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Cannot bind column {column}: {reason}")]
    BindFailed { column: String, reason: String },

    #[error("Cannot decode column {column}: {reason}")]
    DecodeFailed { column: String, reason: String },

    #[error("Telemetry sink failed: {reason}")]
    SinkFailed { reason: String },
}

impl ConnectorError {
    /// Connection-stage error from the underlying client.
    pub fn connect(reason: impl Display) -> Self {
        Self::ConnectFailed {
            reason: reason.to_string(),
        }
    }

    /// Query-stage error from the underlying client.
    pub fn query(reason: impl Display) -> Self {
        Self::QueryFailed {
            reason: reason.to_string(),
        }
    }

    /// Parameter binding error for one column.
    pub fn bind(column: impl Into<String>, reason: impl Display) -> Self {
        Self::BindFailed {
            column: column.into(),
            reason: reason.to_string(),
        }
    }

    /// Row decoding error for one column.
    pub fn decode(column: impl Into<String>, reason: impl Display) -> Self {
        Self::DecodeFailed {
            column: column.into(),
            reason: reason.to_string(),
        }
    }

    /// Telemetry sink error.
    pub fn sink(reason: impl Display) -> Self {
        Self::SinkFailed {
            reason: reason.to_string(),
        }
    }

    /// Whether this error belongs to the configuration tier that must
    /// propagate instead of being folded into a failed outcome.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::SecretsUnavailable { .. })
    }
}

/// Result type alias for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

// ============================================================================
// TESTS
// ============================================================================
