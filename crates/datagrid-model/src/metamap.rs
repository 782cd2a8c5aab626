//! Ordered attribute map used for column, row, cell, and table metadata.
//!
//! A [`MetaMap`] behaves like the loose metadata dictionaries this engine
//! is configured with: reads of missing keys return a configurable default
//! instead of failing, removal of missing keys is a no-op, and nested
//! mappings are themselves `MetaMap`s so dotted traversal works at any
//! depth. Nesting is established by construction — every conversion into
//! [`Value`](crate::Value) (iterator collection, deserialization) produces
//! `Value::Map(MetaMap)` for mapping-shaped input.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::Value;

/// Ordered `String -> Value` map with a default for missing keys.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaMap {
    entries: IndexMap<String, Value>,
    default: Box<Value>,
}

impl MetaMap {
    /// An empty map whose missing-key default is `Null`.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            default: Box::new(Value::Null),
        }
    }

    /// An empty map returning `default` for missing keys.
    pub fn with_default(default: impl Into<Value>) -> Self {
        Self {
            entries: IndexMap::new(),
            default: Box::new(default.into()),
        }
    }

    /// The value handed out for keys that are not present.
    pub fn missing_default(&self) -> &Value {
        &self.default
    }

    pub fn set_missing_default(&mut self, default: impl Into<Value>) {
        self.default = Box::new(default.into());
    }

    /// The stored value for `key`, or the missing-key default.
    pub fn get(&self, key: &str) -> &Value {
        self.entries.get(key).unwrap_or(&self.default)
    }

    /// The stored value for `key`, if present.
    pub fn get_opt(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove `key` if present. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Overlay every entry of `other` onto this map (existing keys are
    /// replaced, order of first insertion is kept).
    pub fn merge(&mut self, other: &MetaMap) {
        for (key, value) in other.iter() {
            self.entries.insert(key.to_owned(), value.clone());
        }
    }

    /// Consuming form of [`merge`](Self::merge).
    pub fn merged(mut self, other: &MetaMap) -> Self {
        self.merge(other);
        self
    }
}

impl Default for MetaMap {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MetaMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = MetaMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for MetaMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a MetaMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for MetaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MetaMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MetaMapVisitor;

        impl<'de> Visitor<'de> for MetaMapVisitor {
            type Value = MetaMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string-keyed map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MetaMap, A::Error> {
                let mut map = MetaMap::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MetaMapVisitor)
    }
}
