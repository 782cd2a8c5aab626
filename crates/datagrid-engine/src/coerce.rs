//! Built-in value coercion.
//!
//! Turns a raw resolved value into the canonical runtime representation for
//! its column's declared kind. Falsy values short-circuit to the default
//! chain before any kind logic runs; a column-level custom coercer replaces
//! the built-in conversions entirely. Inputs a kind has no rule for pass
//! through unchanged, which keeps coercion idempotent.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use datagrid_model::{Column, ColumnKind, MetaMap, Value};

use crate::error::{EngineError, Result};

pub(crate) fn coerce_value(column: &Column, table_meta: &MetaMap, value: Value) -> Result<Value> {
    if value.is_falsy() {
        return Ok(default_for(column, table_meta, value));
    }

    if let Some(coercer) = &column.coerce_value {
        return coercer.call(value).map_err(|source| EngineError::Coercion {
            column: column.name.clone(),
            source,
        });
    }

    let Some(kind) = column.kind else {
        return Ok(value);
    };

    match kind {
        ColumnKind::DateTime => coerce_datetime(column, value),
        ColumnKind::Date => coerce_date(column, value),
        ColumnKind::Int => coerce_int(column, value),
        ColumnKind::Long => coerce_long(column, value),
        ColumnKind::Decimal => coerce_decimal(column, value),
        ColumnKind::Bool => Ok(Value::Bool(!value.is_falsy())),
        ColumnKind::Null => Ok(Value::Null),
        ColumnKind::Text => Ok(Value::Text(value.to_string())),
    }
}

/// Default substituted for a falsy resolved value: the column's declared
/// default, else the table-level default, else the kind's zero value, else
/// the falsy value itself. The chosen default is taken verbatim.
fn default_for(column: &Column, table_meta: &MetaMap, value: Value) -> Value {
    if let Some(default) = &column.default_value {
        if !default.is_falsy() {
            return default.clone();
        }
    }
    if let Some(default) = table_meta.get_opt("default_value") {
        if !default.is_falsy() {
            return default.clone();
        }
    }
    match column.kind {
        Some(ColumnKind::Decimal) => Value::Decimal(Decimal::ZERO),
        Some(ColumnKind::Int) => Value::Int(0),
        Some(ColumnKind::Long) => Value::Long(0),
        Some(ColumnKind::Bool | ColumnKind::Text) => Value::Text(String::new()),
        _ => value,
    }
}

fn coerce_datetime(column: &Column, value: Value) -> Result<Value> {
    match value {
        Value::Text(text) => {
            let format = column
                .input_format
                .as_deref()
                .unwrap_or("%Y-%m-%d %H:%M:%S%.f");
            let parsed = NaiveDateTime::parse_from_str(&text, format).map_err(|source| {
                EngineError::DateParse {
                    column: column.name.clone(),
                    text: text.clone(),
                    source,
                }
            })?;
            Ok(Value::DateTime(parsed))
        }
        Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Decimal(_) => {
            from_timestamp(column, &value).map(Value::DateTime)
        }
        other => Ok(other),
    }
}

fn coerce_date(column: &Column, value: Value) -> Result<Value> {
    match value {
        Value::Text(text) => {
            let format = column.input_format.as_deref().unwrap_or("%Y-%m-%d");
            let parsed =
                NaiveDate::parse_from_str(&text, format).map_err(|source| EngineError::DateParse {
                    column: column.name.clone(),
                    text: text.clone(),
                    source,
                })?;
            Ok(Value::Date(parsed))
        }
        Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Decimal(_) => {
            from_timestamp(column, &value).map(|datetime| Value::Date(datetime.date()))
        }
        other => Ok(other),
    }
}

/// Interpret a numeric value as a Unix timestamp (UTC, fractional seconds
/// preserved to millisecond precision).
fn from_timestamp(column: &Column, value: &Value) -> Result<NaiveDateTime> {
    let millis = match value {
        Value::Int(i) => Some(i64::from(*i).saturating_mul(1000)),
        Value::Long(l) => l.checked_mul(1000),
        Value::Float(f) if f.is_finite() => Some((f * 1000.0).round() as i64),
        Value::Float(_) => None,
        Value::Decimal(d) => (d * Decimal::from(1000)).trunc().to_i64(),
        _ => None,
    };
    millis
        .and_then(DateTime::from_timestamp_millis)
        .map(|datetime| datetime.naive_utc())
        .ok_or_else(|| EngineError::TimestampRange {
            column: column.name.clone(),
        })
}

fn coerce_int(column: &Column, value: Value) -> Result<Value> {
    let overflow = || EngineError::Overflow {
        column: column.name.clone(),
        target: ColumnKind::Int,
    };
    match value {
        Value::Int(i) => Ok(Value::Int(i)),
        Value::Long(l) => i32::try_from(l).map(Value::Int).map_err(|_| overflow()),
        Value::Float(f) if f.is_finite() => {
            let truncated = f.trunc();
            if truncated >= f64::from(i32::MIN) && truncated <= f64::from(i32::MAX) {
                Ok(Value::Int(truncated as i32))
            } else {
                Err(overflow())
            }
        }
        Value::Decimal(d) => d.trunc().to_i32().map(Value::Int).ok_or_else(overflow),
        Value::Bool(b) => Ok(Value::Int(i32::from(b))),
        Value::Text(text) => text
            .trim()
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| EngineError::NumberParse {
                column: column.name.clone(),
                text,
                target: ColumnKind::Int,
            }),
        other => Err(EngineError::Unsupported {
            column: column.name.clone(),
            kind: other.kind(),
            target: ColumnKind::Int,
        }),
    }
}

fn coerce_long(column: &Column, value: Value) -> Result<Value> {
    let overflow = || EngineError::Overflow {
        column: column.name.clone(),
        target: ColumnKind::Long,
    };
    match value {
        Value::Long(l) => Ok(Value::Long(l)),
        Value::Int(i) => Ok(Value::Long(i64::from(i))),
        Value::Float(f) if f.is_finite() => {
            let truncated = f.trunc();
            if truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                Ok(Value::Long(truncated as i64))
            } else {
                Err(overflow())
            }
        }
        Value::Decimal(d) => d.trunc().to_i64().map(Value::Long).ok_or_else(overflow),
        Value::Bool(b) => Ok(Value::Long(i64::from(b))),
        Value::Text(text) => text
            .trim()
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|_| EngineError::NumberParse {
                column: column.name.clone(),
                text,
                target: ColumnKind::Long,
            }),
        other => Err(EngineError::Unsupported {
            column: column.name.clone(),
            kind: other.kind(),
            target: ColumnKind::Long,
        }),
    }
}

fn coerce_decimal(column: &Column, value: Value) -> Result<Value> {
    match value {
        Value::Decimal(d) => Ok(Value::Decimal(d)),
        // Conversion goes through the value's text rendering so binary
        // floats keep their printed digits instead of their bit pattern.
        other => {
            let text = other.to_string();
            text.trim()
                .parse::<Decimal>()
                .map(Value::Decimal)
                .map_err(|_| EngineError::NumberParse {
                    column: column.name.clone(),
                    text,
                    target: ColumnKind::Decimal,
                })
        }
    }
}
