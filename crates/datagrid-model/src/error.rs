//! Error types for the datagrid data model.

use thiserror::Error;

use crate::value::ValueKind;

/// Boxed error returned by caller-supplied value and coercion callbacks.
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the data model itself.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A composite or unevaluated value ended up in a cell. Coercion is
    /// expected to normalize cell values to one of the eight recognized
    /// kinds, so hitting this is a modeling bug, not a data problem.
    #[error("{kind} value is not a valid cell value")]
    UnsupportedCellValue { kind: ValueKind },

    /// A column kind name could not be parsed.
    #[error("unknown column kind: {name}")]
    UnknownKind { name: String },
}

/// Convenience alias for model results.
pub type Result<T> = std::result::Result<T, ModelError>;
