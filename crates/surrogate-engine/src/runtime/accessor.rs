//! Property accessors
//!
//! Each strategy gives mirrored properties its own read/write/exists/unset
//! semantics.
//!
//! | Operation | null-object                    | passthrough                 |
//! |-----------|--------------------------------|-----------------------------|
//! | initial   | null                           | declared default (or null)  |
//! | read      | stored value                   | stored value, null if unset |
//! | write     | stores                         | stores                      |
//! | exists    | stored value is not null       | set and not null            |
//! | unset     | back to null                   | removes the entry           |

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::builder::{MirroredProperty, PropertyAccessorKind};

use super::Value;

/// Property values of one proxy instance, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyStore {
    values: IndexMap<String, Value>,
}

impl PropertyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Store a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Remove an entry
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    /// Whether an entry is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read/write/exists/unset semantics of mirrored properties
pub trait PropertyAccessor: Send + Sync {
    /// Value a fresh instance starts with
    fn initial(&self, property: &MirroredProperty) -> Value;

    /// Read a property
    fn read(&self, store: &PropertyStore, name: &str) -> Value {
        store.get(name).cloned().unwrap_or_default()
    }

    /// Write a property
    fn write(&self, store: &mut PropertyStore, name: &str, value: Value) {
        store.insert(name, value);
    }

    /// Whether a property counts as set
    fn exists(&self, store: &PropertyStore, name: &str) -> bool {
        store.get(name).is_some_and(|v| !v.is_null())
    }

    /// Unset a property
    fn unset(&self, store: &mut PropertyStore, name: &str);
}

/// Accessor of null-object proxies
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObjectAccessor;

impl PropertyAccessor for NullObjectAccessor {
    fn initial(&self, _property: &MirroredProperty) -> Value {
        Value::Null
    }

    fn unset(&self, store: &mut PropertyStore, name: &str) {
        store.insert(name, Value::Null);
    }
}

/// Accessor of proxies that behave like the original class
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughAccessor;

impl PropertyAccessor for PassthroughAccessor {
    fn initial(&self, property: &MirroredProperty) -> Value {
        property.default.as_ref().map(Value::from).unwrap_or_default()
    }

    fn unset(&self, store: &mut PropertyStore, name: &str) {
        store.remove(name);
    }
}

/// Accessor implementing `kind`
pub fn accessor_for(kind: PropertyAccessorKind) -> &'static dyn PropertyAccessor {
    match kind {
        PropertyAccessorKind::NullObject => &NullObjectAccessor,
        PropertyAccessorKind::Passthrough => &PassthroughAccessor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Literal;

    fn property(kind: PropertyAccessorKind) -> MirroredProperty {
        MirroredProperty {
            name: "publicProperty".to_string(),
            default: Some(Literal::Str("publicPropertyDefault".to_string())),
            accessor: kind,
        }
    }

    #[test]
    fn test_null_object_ignores_default() {
        let accessor = accessor_for(PropertyAccessorKind::NullObject);
        assert_eq!(accessor.initial(&property(PropertyAccessorKind::NullObject)), Value::Null);
    }

    #[test]
    fn test_null_object_unset_restores_null() {
        let accessor = accessor_for(PropertyAccessorKind::NullObject);
        let mut store = PropertyStore::new();
        accessor.write(&mut store, "publicProperty", Value::from("set"));
        assert!(accessor.exists(&store, "publicProperty"));

        accessor.unset(&mut store, "publicProperty");
        assert!(!accessor.exists(&store, "publicProperty"));
        assert!(store.contains("publicProperty"));
        assert_eq!(accessor.read(&store, "publicProperty"), Value::Null);
    }

    #[test]
    fn test_passthrough_unset_removes() {
        let accessor = accessor_for(PropertyAccessorKind::Passthrough);
        let mut store = PropertyStore::new();
        let initial = accessor.initial(&property(PropertyAccessorKind::Passthrough));
        assert_eq!(initial, Value::from("publicPropertyDefault"));

        accessor.write(&mut store, "publicProperty", initial);
        accessor.unset(&mut store, "publicProperty");
        assert!(!store.contains("publicProperty"));
        assert!(!accessor.exists(&store, "publicProperty"));
    }
}
