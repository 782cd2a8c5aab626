//! Cell value resolution.
//!
//! Implements the three getter strategies: callback invocation, dotted-path
//! traversal, and static literals. Path traversal tries keyed/indexed lookup
//! before named-field lookup for every segment, and transparently invokes
//! lazy accessors it passes through. An unresolvable path degrades to the
//! literal path text (logged at debug level) unless strict mode is on.

use datagrid_model::{Column, Getter, Record, Value};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Outcome of getter resolution. Literal outcomes bypass coercion.
pub(crate) enum Resolved {
    Dynamic(Value),
    Literal(Value),
}

pub(crate) fn resolve_value(
    record: &dyn Record,
    column: &Column,
    getter: &Getter,
    strict: bool,
) -> Result<Resolved> {
    match getter {
        Getter::Func(callback) => {
            let value = callback
                .call(record, &column.value_args)
                .map_err(|source| EngineError::Callback {
                    column: column.name.clone(),
                    source,
                })?;
            Ok(Resolved::Dynamic(value))
        }
        Getter::Path(path) => match walk_path(record, path) {
            Some(value) => Ok(Resolved::Dynamic(value)),
            None if strict => Err(EngineError::PathResolution {
                column: column.name.clone(),
                path: path.clone(),
            }),
            None => {
                debug!(
                    column = %column.name,
                    path = %path,
                    "path did not resolve; using the path text as a static value"
                );
                Ok(Resolved::Literal(Value::Text(path.clone())))
            }
        },
        Getter::Literal(value) => Ok(Resolved::Literal(value.clone())),
    }
}

/// Walk a dotted path through a record, one segment at a time.
fn walk_path(record: &dyn Record, path: &str) -> Option<Value> {
    let mut current: Option<Value> = None;
    for segment in path.split('.') {
        let next = match &current {
            None => lookup(record, segment)?,
            Some(value) => lookup(value, segment)?,
        };
        current = Some(evaluate(next));
    }
    current
}

fn lookup(record: &dyn Record, segment: &str) -> Option<Value> {
    record
        .by_key(segment)
        .or_else(|| record.by_field(segment))
}

/// Invoke lazy accessors so traversal can continue through them.
fn evaluate(value: Value) -> Value {
    match value {
        Value::Lazy(lazy) => lazy.resolve(),
        other => other,
    }
}
