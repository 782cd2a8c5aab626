//! Error types for table construction.

use thiserror::Error;

use datagrid_model::{ColumnKind, DynError, ModelError, ValueKind};

/// Errors that can occur while resolving and coercing cell values.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A caller-supplied value callback failed.
    #[error("value callback failed for column '{column}': {source}")]
    Callback {
        column: String,
        #[source]
        source: DynError,
    },

    /// A caller-supplied coercion callback failed.
    #[error("custom coercion failed for column '{column}': {source}")]
    Coercion {
        column: String,
        #[source]
        source: DynError,
    },

    /// A dotted path did not resolve and strict mode is enabled.
    #[error("cannot resolve path '{path}' for column '{column}'")]
    PathResolution { column: String, path: String },

    /// A date or datetime string did not match the column's input format.
    #[error("invalid date text '{text}' for column '{column}'")]
    DateParse {
        column: String,
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Text that should coerce to a number did not parse.
    #[error("invalid {target} text '{text}' for column '{column}'")]
    NumberParse {
        column: String,
        text: String,
        target: ColumnKind,
    },

    /// A numeric value does not fit the target width.
    #[error("value overflows {target} for column '{column}'")]
    Overflow { column: String, target: ColumnKind },

    /// A numeric timestamp is outside the representable datetime range.
    #[error("timestamp out of range for column '{column}'")]
    TimestampRange { column: String },

    /// The resolved value cannot be coerced to the declared kind.
    #[error("cannot coerce {kind} value to {target} for column '{column}'")]
    Unsupported {
        column: String,
        kind: ValueKind,
        target: ColumnKind,
    },

    /// Model-level failure (e.g. an unsupported cell value).
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
