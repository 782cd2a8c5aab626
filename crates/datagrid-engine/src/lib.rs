//! Typed tabular views over heterogeneous source records.
//!
//! This crate turns a list of source records and a list of declarative
//! column descriptors into a typed grid of cells:
//!
//! - **resolve**: each cell's raw value comes from its column's getter
//!   strategy — a callback, a dotted path walked through the record, or a
//!   static literal
//! - **coerce**: resolved values are converted to the column's declared
//!   semantic kind (with falsy values replaced by a configurable default)
//! - **table**: rows and cells are assembled once, in a single synchronous
//!   pass, and exposed through ordered iteration and position lookup
//!
//! # Example
//!
//! ```
//! use datagrid_engine::{Column, ColumnKind, MetaMap, Table, Value};
//!
//! let records = vec![
//!     Value::Map(MetaMap::from_iter([
//!         ("count", Value::Int(3)),
//!         ("unit_price", Value::Text("9.995".into())),
//!     ])),
//! ];
//! let columns = vec![
//!     Column::new("qty").with_kind(ColumnKind::Int).with_value("count"),
//!     Column::new("price")
//!         .with_kind(ColumnKind::Decimal)
//!         .with_value("unit_price")
//!         .with_precision(2),
//! ];
//!
//! let table = Table::new(records, columns).unwrap();
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.rows()[0].cells()[0].value(), &Value::Int(3));
//! ```
//!
//! Unresolvable dotted paths degrade to the literal path text by default
//! (with a debug-level diagnostic); enable
//! [`TableOptions::strict_paths`] to fail construction instead.

mod coerce;
mod error;
mod options;
mod resolve;
mod table;

pub use error::{EngineError, Result};
pub use options::TableOptions;
pub use table::{Cell, Row, SourceRecord, Table, TableBuilder, TableIter};

// Re-export the model types that appear in this crate's public API.
pub use datagrid_model::{
    Coercer, Column, ColumnKind, DynError, Getter, LazyValue, MetaMap, ModelError, Record, Value,
    ValueFn, ValueKind,
};
