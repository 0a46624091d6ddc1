//! Keyed extension data attached to an object.

use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::{any::Any, sync::Arc, sync::OnceLock};

/// A keyed store of typed values living outside an object's static fields.
///
/// Writes overwrite unconditionally; reads are typed and return `None` when
/// the stored tag differs from the requested type.
#[derive(Default)]
pub struct DataStore {
    entries: RwLock<FxHashMap<Arc<str>, Value>>,
}

impl DataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<Arc<str>>, value: T) {
        self.set_value(key, Value::new(value));
    }

    /// Store an already boxed value under `key`.
    pub fn set_value(&self, key: impl Into<Arc<str>>, value: Value) {
        self.entries.write().insert(key.into(), value);
    }

    /// Read `key` as `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.entries.read().get(key)?.downcast_arc::<T>()
    }

    /// Read `key` without a type check.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    /// Remove `key`, returning the previous value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().remove(key)
    }

    /// Whether `key` holds a value of any type.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// A lazy view of all entries.
    ///
    /// Nothing is copied until the snapshot is first iterated; from then on
    /// every iteration replays that same state.
    pub fn snapshot(&self) -> DataSnapshot<'_> {
        DataSnapshot {
            store: self,
            taken: OnceLock::new(),
        }
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.read().iter()).finish()
    }
}

/// The restartable sequence returned by [`DataStore::snapshot`].
pub struct DataSnapshot<'a> {
    store: &'a DataStore,
    taken: OnceLock<Vec<(Arc<str>, Value)>>,
}

impl DataSnapshot<'_> {
    /// Iterate the entries as they were at first consumption.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries().iter().map(|(k, v)| (&**k, v))
    }

    fn entries(&self) -> &[(Arc<str>, Value)] {
        self.taken.get_or_init(|| {
            self.store
                .entries
                .read()
                .iter()
                .map(|(k, v)| (Arc::clone(k), v.clone()))
                .collect()
        })
    }
}

impl<'s> IntoIterator for &'s DataSnapshot<'_> {
    type Item = (&'s str, &'s Value);
    type IntoIter = Box<dyn Iterator<Item = (&'s str, &'s Value)> + 's>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
