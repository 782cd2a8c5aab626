//! Declarative column descriptors.
//!
//! A [`Column`] describes one output field: its name, semantic kind, how to
//! pull a raw value out of a source record (the [`Getter`] strategy), what to
//! substitute for empty values, and display metadata for a downstream
//! renderer (prefix/suffix/precision/date formats). Columns can be built in
//! code with the `with_*` methods or deserialized from configuration:
//!
//! ```
//! use datagrid_model::{Column, ColumnKind, Getter};
//!
//! let column: Column = serde_json::from_str(
//!     r#"{"name": "qty", "type": "int", "value": "count"}"#,
//! ).unwrap();
//! assert_eq!(column.kind, Some(ColumnKind::Int));
//! assert_eq!(column.value, Getter::Path("count".into()));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DynError, ModelError};
use crate::metamap::MetaMap;
use crate::record::Record;
use crate::value::Value;

/// The semantic type a column coerces its resolved values to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    Int,
    Long,
    Decimal,
    Bool,
    Date,
    DateTime,
    Null,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "string",
            ColumnKind::Int => "int",
            ColumnKind::Long => "long",
            ColumnKind::Decimal => "decimal",
            ColumnKind::Bool => "bool",
            ColumnKind::Date => "date",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Null => "null",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = ModelError;

    /// Parse a kind name. Accepts the canonical spellings plus common
    /// aliases, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" | "str" => Ok(ColumnKind::Text),
            "int" | "integer" => Ok(ColumnKind::Int),
            "long" | "long-integer" => Ok(ColumnKind::Long),
            "decimal" => Ok(ColumnKind::Decimal),
            "bool" | "boolean" => Ok(ColumnKind::Bool),
            "date" => Ok(ColumnKind::Date),
            "datetime" => Ok(ColumnKind::DateTime),
            "null" => Ok(ColumnKind::Null),
            _ => Err(ModelError::UnknownKind { name: s.to_owned() }),
        }
    }
}

impl Serialize for ColumnKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

type ValueFnInner = dyn Fn(&dyn Record, &MetaMap) -> Result<Value, DynError> + Send + Sync;

/// A caller-supplied value callback: receives the source record and the
/// column's `value_args`, returns the raw value. Compares by pointer
/// identity.
#[derive(Clone)]
pub struct ValueFn(Arc<ValueFnInner>);

impl ValueFn {
    pub fn new(
        callback: impl Fn(&dyn Record, &MetaMap) -> Result<Value, DynError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(callback))
    }

    pub fn call(&self, record: &dyn Record, args: &MetaMap) -> Result<Value, DynError> {
        (self.0)(record, args)
    }
}

impl fmt::Debug for ValueFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueFn(..)")
    }
}

impl PartialEq for ValueFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

type CoercerInner = dyn Fn(Value) -> Result<Value, DynError> + Send + Sync;

/// A caller-supplied coercion callback replacing the built-in coercion for
/// one column. Compares by pointer identity.
#[derive(Clone)]
pub struct Coercer(Arc<CoercerInner>);

impl Coercer {
    pub fn new(callback: impl Fn(Value) -> Result<Value, DynError> + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    pub fn call(&self, value: Value) -> Result<Value, DynError> {
        (self.0)(value)
    }
}

impl fmt::Debug for Coercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coercer(..)")
    }
}

impl PartialEq for Coercer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// How a cell's raw value is obtained from a source record.
#[derive(Debug, Clone, PartialEq)]
pub enum Getter {
    /// Invoke a callback with the record and the column's `value_args`.
    /// Failures are hard errors.
    Func(ValueFn),
    /// Walk a dotted path through the record.
    Path(String),
    /// Use a fixed value verbatim; literals are never coerced.
    Literal(Value),
}

impl Getter {
    pub fn func(
        callback: impl Fn(&dyn Record, &MetaMap) -> Result<Value, DynError> + Send + Sync + 'static,
    ) -> Self {
        Getter::Func(ValueFn::new(callback))
    }

    pub fn path(path: impl Into<String>) -> Self {
        Getter::Path(path.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Getter::Literal(value.into())
    }
}

impl Default for Getter {
    fn default() -> Self {
        Getter::Literal(Value::Null)
    }
}

impl From<&str> for Getter {
    /// Strings are dotted paths; use [`Getter::literal`] for fixed text.
    fn from(path: &str) -> Self {
        Getter::Path(path.to_owned())
    }
}

impl From<String> for Getter {
    fn from(path: String) -> Self {
        Getter::Path(path)
    }
}

impl<'de> Deserialize<'de> for Getter {
    /// Configuration keeps the strategy convention of the engine: a string
    /// is a dotted path, anything else is a static literal. Callbacks are
    /// only constructible in code.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Text(path) => Getter::Path(path),
            literal => Getter::Literal(literal),
        })
    }
}

/// Declarative definition of one output field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Column {
    /// Output field name. Columns with an empty name are skipped by
    /// name-based lookup but still produce cells.
    pub name: String,

    /// Semantic kind; `None` leaves resolved values uncoerced.
    #[serde(rename = "type")]
    pub kind: Option<ColumnKind>,

    /// Value-resolution strategy for data rows.
    pub value: Getter,

    /// Extra arguments forwarded to [`Getter::Func`] callbacks.
    pub value_args: MetaMap,

    /// Substituted when the resolved value is falsy. Taken verbatim, not
    /// coerced.
    pub default_value: Option<Value>,

    /// Strategy for the total row; falls back to `value` when unset.
    pub total_value: Option<Getter>,

    /// Custom coercion replacing the built-in kind coercion. Code-only.
    #[serde(skip)]
    pub coerce_value: Option<Coercer>,

    /// Display metadata for a downstream renderer.
    pub prefix: Option<String>,
    pub suffix: Option<String>,

    /// Decimal display digits; cells fall back to 2 when unset.
    pub precision: Option<u32>,

    /// Parse pattern for date-like kinds (strftime syntax).
    pub input_format: Option<String>,

    /// Render pattern handed to a downstream renderer. Date-like columns
    /// get a default at table-build time when unset.
    pub output_format: Option<String>,

    /// Any further metadata keys from the column spec.
    #[serde(flatten)]
    pub extra: MetaMap,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_value(mut self, getter: impl Into<Getter>) -> Self {
        self.value = getter.into();
        self
    }

    /// Shorthand for a callback strategy.
    pub fn with_func(
        mut self,
        callback: impl Fn(&dyn Record, &MetaMap) -> Result<Value, DynError> + Send + Sync + 'static,
    ) -> Self {
        self.value = Getter::func(callback);
        self
    }

    pub fn with_value_args(mut self, args: MetaMap) -> Self {
        self.value_args = args;
        self
    }

    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_total_value(mut self, getter: impl Into<Getter>) -> Self {
        self.total_value = Some(getter.into());
        self
    }

    pub fn with_coercion(
        mut self,
        callback: impl Fn(Value) -> Result<Value, DynError> + Send + Sync + 'static,
    ) -> Self {
        self.coerce_value = Some(Coercer::new(callback));
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_input_format(mut self, format: impl Into<String>) -> Self {
        self.input_format = Some(format.into());
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }

    /// The getter used for the total row: `total_value` when set, else the
    /// ordinary `value` strategy.
    pub fn total_getter(&self) -> &Getter {
        self.total_value.as_ref().unwrap_or(&self.value)
    }
}
