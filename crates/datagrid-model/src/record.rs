//! Source-record access capabilities.

use std::fmt;

use crate::metamap::MetaMap;
use crate::value::Value;

/// A source record the engine can pull cell values from.
///
/// Dotted-path resolution tries the two lookups in order for each path
/// segment: [`by_key`](Record::by_key) (mapping or sequence access) first,
/// then [`by_field`](Record::by_field) (named fields). Value trees implement
/// `by_key`; caller types expose struct fields through `by_field`:
///
/// ```
/// use datagrid_model::{Record, Value};
///
/// #[derive(Debug)]
/// struct Order {
///     count: i64,
/// }
///
/// impl Record for Order {
///     fn by_key(&self, _segment: &str) -> Option<Value> {
///         None
///     }
///
///     fn by_field(&self, segment: &str) -> Option<Value> {
///         match segment {
///             "count" => Some(Value::Long(self.count)),
///             _ => None,
///         }
///     }
/// }
///
/// let order = Order { count: 3 };
/// assert_eq!(order.by_field("count"), Some(Value::Long(3)));
/// ```
pub trait Record: fmt::Debug + Send + Sync {
    /// Mapping or sequence lookup for one path segment. Tried first.
    fn by_key(&self, segment: &str) -> Option<Value>;

    /// Named-field lookup, used when [`by_key`](Record::by_key) misses.
    fn by_field(&self, _segment: &str) -> Option<Value> {
        None
    }
}

impl Record for Value {
    fn by_key(&self, segment: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get_opt(segment).cloned(),
            Value::List(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .cloned(),
            _ => None,
        }
    }
}

impl Record for MetaMap {
    fn by_key(&self, segment: &str) -> Option<Value> {
        self.get_opt(segment).cloned()
    }
}
