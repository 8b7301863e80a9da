//! RETURNING-row decoding into plain JSON maps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use conjure_core::{ConnectorError, ConnectorResult, RowData};
use postgres_types::Type;
use serde_json::Value as JsonValue;
use tokio_postgres::Row;
use uuid::Uuid;

/// Decode one returned row column-by-column.
pub fn decode_row(row: &Row) -> ConnectorResult<RowData> {
    let mut data = RowData::new();
    for idx in 0..row.columns().len() {
        let name = row.columns()[idx].name().to_string();
        let value = decode_column(row, idx)?;
        data.insert(name, value);
    }
    Ok(data)
}

fn decode_column(row: &Row, idx: usize) -> ConnectorResult<JsonValue> {
    let column = &row.columns()[idx];
    let name = column.name();
    let ty = column.type_();

    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(JsonValue::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(|v| JsonValue::from(i64::from(v)))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(|v| JsonValue::from(i64::from(v)))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(JsonValue::from)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(|v| JsonValue::from(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(JsonValue::from)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(JsonValue::String)
    } else if *ty == Type::UUID {
        row.try_get::<_, Option<Uuid>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(|v| JsonValue::String(v.to_string()))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(|v| JsonValue::String(v.to_rfc3339()))
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(|v| JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
            .map(|v| JsonValue::String(v.to_string()))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<JsonValue>>(idx)
            .map_err(|e| ConnectorError::decode(name, e))?
    } else {
        // Exotic column types in RETURNING * should not fail the write.
        tracing::debug!(column = name, ty = %ty, "unmapped column type decoded as null");
        None
    };

    Ok(value.unwrap_or(JsonValue::Null))
}
