//! Configuration options for table construction.

use serde::{Deserialize, Serialize};

/// Behavior switches for [`TableBuilder`](crate::TableBuilder).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Fail construction when a dotted path does not resolve, instead of
    /// degrading to the literal path text.
    /// Default: false (lenient, for compatibility).
    #[serde(default)]
    pub strict_paths: bool,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_paths(mut self, strict: bool) -> Self {
        self.strict_paths = strict;
        self
    }
}
