//! Data model for datagrid tables.
//!
//! This crate defines the leaf types the table engine is built from:
//!
//! - **value**: [`Value`], the tagged union of everything a cell or source
//!   record can hold, and [`ValueKind`], its tag
//! - **metamap**: [`MetaMap`], the ordered attribute map used for all loose
//!   metadata (missing keys resolve to a configurable default)
//! - **record**: [`Record`], the capability trait the resolver walks dotted
//!   paths over
//! - **column**: [`Column`] descriptors with their [`ColumnKind`] semantic
//!   types and [`Getter`] value-resolution strategies
//!
//! Declarative types deserialize from configuration via serde; callback
//! strategies ([`Getter::Func`], [`Coercer`]) are code-only.

pub mod column;
pub mod error;
pub mod metamap;
pub mod record;
pub mod value;

pub use column::{Coercer, Column, ColumnKind, Getter, ValueFn};
pub use error::{DynError, ModelError, Result};
pub use metamap::MetaMap;
pub use record::Record;
pub use value::{LazyValue, Value, ValueKind};
