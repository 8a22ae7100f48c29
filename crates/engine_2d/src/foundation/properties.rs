//! Heterogeneous key-value property bags
//!
//! Entities, bodies, fixtures, events, and spawn parameters all carry a
//! `Properties` bag: arbitrary values keyed by strings, looked up by type at
//! the call site. Absence is an empty result, never an error.

use std::any::Any;
use std::collections::HashMap;

/// String-keyed bag of heterogeneous values
#[derive(Default)]
pub struct Properties {
    values: HashMap<String, Box<dyn Any>>,
}

impl Properties {
    /// Create an empty property bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing value under the same key
    pub fn put(&mut self, key: impl Into<String>, value: impl Any) -> &mut Self {
        self.values.insert(key.into(), Box::new(value));
        self
    }

    /// Builder-style insert for constructing bags inline
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Any) -> Self {
        self.put(key, value);
        self
    }

    /// Get a reference to the value under `key` if it exists and has type `T`
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    /// Get a mutable reference to the value under `key`
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Get a copy of the value under `key`, or the given default when absent
    /// or of a different type
    pub fn get_or<T: Any + Clone>(&self, key: &str, default: T) -> T {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Check whether any value is stored under `key`
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove and return the value under `key` if it has type `T`
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        let value = self.values.remove(key)?;
        match value.downcast::<T>() {
            Ok(boxed) => Some(*boxed),
            Err(original) => {
                // Type mismatch: keep the value in place
                self.values.insert(key.to_string(), original);
                None
            }
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag holds no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Properties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Properties")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
