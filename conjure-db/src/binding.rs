//! Parameter binding against server-reported types.
//!
//! The upsert statement is prepared first; the server reports the concrete
//! type of every placeholder (inferred from the target columns), and each
//! payload value is encoded against that type here. Pairings that cannot be
//! represented produce a typed bind error instead of a protocol failure.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, Utc};
use conjure_core::{ConnectorError, ConnectorResult, SqlValue};
use postgres_types::{to_sql_checked, IsNull, ToSql, Type};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A bound parameter ready to hand to the client.
pub type BoundParam = Box<dyn ToSql + Send + Sync>;

/// SQL NULL accepted for any parameter type.
#[derive(Debug)]
struct SqlNull;

impl ToSql for SqlNull {
    fn to_sql(
        &self,
        _ty: &Type,
        _out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn is_text_family(ty: &Type) -> bool {
    *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
}

/// Encode one payload value for the parameter type the server reported.
pub fn bind_value(column: &str, value: &SqlValue, ty: &Type) -> ConnectorResult<BoundParam> {
    match value {
        SqlValue::Null => Ok(Box::new(SqlNull)),

        SqlValue::Bool(b) => {
            if *ty == Type::BOOL {
                Ok(Box::new(*b))
            } else if is_text_family(ty) {
                Ok(Box::new(b.to_string()))
            } else {
                Err(mismatch(column, value, ty))
            }
        }

        SqlValue::Integer(i) => {
            if *ty == Type::INT8 {
                Ok(Box::new(*i))
            } else if *ty == Type::INT4 {
                let narrowed = i32::try_from(*i)
                    .map_err(|_| ConnectorError::bind(column, format!("{i} overflows int4")))?;
                Ok(Box::new(narrowed))
            } else if *ty == Type::INT2 {
                let narrowed = i16::try_from(*i)
                    .map_err(|_| ConnectorError::bind(column, format!("{i} overflows int2")))?;
                Ok(Box::new(narrowed))
            } else if *ty == Type::FLOAT8 {
                Ok(Box::new(*i as f64))
            } else if *ty == Type::FLOAT4 {
                Ok(Box::new(*i as f32))
            } else if is_text_family(ty) {
                Ok(Box::new(i.to_string()))
            } else {
                Err(mismatch(column, value, ty))
            }
        }

        SqlValue::Float(f) => {
            if *ty == Type::FLOAT8 {
                Ok(Box::new(*f))
            } else if *ty == Type::FLOAT4 {
                Ok(Box::new(*f as f32))
            } else if is_text_family(ty) {
                Ok(Box::new(f.to_string()))
            } else {
                Err(mismatch(column, value, ty))
            }
        }

        SqlValue::Text(s) => {
            if is_text_family(ty) {
                Ok(Box::new(s.clone()))
            } else if *ty == Type::UUID {
                let parsed = Uuid::parse_str(s)
                    .map_err(|e| ConnectorError::bind(column, format!("invalid uuid: {e}")))?;
                Ok(Box::new(parsed))
            } else if *ty == Type::TIMESTAMPTZ {
                let parsed = DateTime::parse_from_rfc3339(s)
                    .map_err(|e| ConnectorError::bind(column, format!("invalid timestamp: {e}")))?;
                Ok(Box::new(parsed.with_timezone(&Utc)))
            } else if *ty == Type::DATE {
                let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|e| ConnectorError::bind(column, format!("invalid date: {e}")))?;
                Ok(Box::new(parsed))
            } else if *ty == Type::JSON || *ty == Type::JSONB {
                Ok(Box::new(JsonValue::String(s.clone())))
            } else {
                Err(mismatch(column, value, ty))
            }
        }

        SqlValue::Json(v) => {
            if *ty == Type::JSON || *ty == Type::JSONB {
                Ok(Box::new(v.clone()))
            } else if is_text_family(ty) {
                Ok(Box::new(v.to_string()))
            } else {
                Err(mismatch(column, value, ty))
            }
        }
    }
}

fn mismatch(column: &str, value: &SqlValue, ty: &Type) -> ConnectorError {
    ConnectorError::bind(
        column,
        format!("{} value cannot bind to column type {}", value.kind(), ty),
    )
}

// ============================================================================
// TESTS
// ============================================================================
