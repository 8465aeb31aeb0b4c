//! Persistence for table layout state.
//!
//! [`KeyValueStore`] is the raw backend contract: small string blobs by key,
//! synchronous and fallible. [`TableStateStore`] wraps a backend with typed
//! JSON serialization and derives every key from a `(storage key, Aspect)`
//! pair, so two aspects of the same table can never share an entry.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;

/// Backend trait for layout storage.
///
/// Implementations handle raw string storage/retrieval. Any call may fail;
/// callers treat failures as "nothing stored".
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under a key.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value under a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One persisted facet of a table's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aspect {
    /// Chosen page size.
    Pagination,
    /// Column visibility map.
    Visibility,
    /// Column order list.
    Order,
    /// Column width map.
    Widths,
}

impl Aspect {
    /// Every aspect, in a stable order.
    pub const ALL: [Aspect; 4] = [
        Aspect::Pagination,
        Aspect::Visibility,
        Aspect::Order,
        Aspect::Widths,
    ];

    /// Backend key for this aspect of the given table.
    pub fn key(self, storage_key: &str) -> String {
        match self {
            Aspect::Pagination => format!("pagination-{storage_key}"),
            Aspect::Visibility => format!("column-visibility-{storage_key}"),
            Aspect::Order => format!("{storage_key}-order"),
            Aspect::Widths => format!("column-widths-{storage_key}"),
        }
    }
}

/// Typed, namespaced view of a [`KeyValueStore`] for one table.
///
/// Every read and write is best-effort: errors are logged and swallowed.
#[derive(Clone)]
pub struct TableStateStore {
    backend: Arc<dyn KeyValueStore>,
    storage_key: String,
}

impl fmt::Debug for TableStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStateStore")
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

impl TableStateStore {
    /// Create a store for the table identified by `storage_key`.
    pub fn new(backend: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            backend,
            storage_key: storage_key.into(),
        }
    }

    /// A store that keeps nothing between instances.
    pub fn ephemeral(storage_key: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), storage_key)
    }

    /// The caller-supplied table key.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Load and decode an aspect. Missing, unreadable or corrupt data is `None`.
    pub fn load<T: DeserializeOwned>(&self, aspect: Aspect) -> Option<T> {
        let key = aspect.key(&self.storage_key);
        match self.try_load(&key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("[store] failed to read {key}: {err}");
                None
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and write an aspect. Returns whether the write succeeded.
    pub fn save<T: Serialize + ?Sized>(&self, aspect: Aspect, value: &T) -> bool {
        let key = aspect.key(&self.storage_key);
        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|raw| self.backend.set(&key, &raw));
        match result {
            Ok(()) => true,
            Err(err) => {
                log::warn!("[store] failed to write {key}: {err}");
                false
            }
        }
    }

    /// Delete an aspect.
    pub fn clear(&self, aspect: Aspect) {
        let key = aspect.key(&self.storage_key);
        if let Err(err) = self.backend.remove(&key) {
            log::warn!("[store] failed to remove {key}: {err}");
        }
    }

    /// Delete every aspect of this table.
    pub fn clear_all(&self) {
        for aspect in Aspect::ALL {
            self.clear(aspect);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Backend whose every call fails.
    #[derive(Debug, Default)]
    pub struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::unavailable("storage disabled"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::unavailable("quota exceeded"))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::unavailable("storage disabled"))
        }
    }

    pub fn failing(storage_key: &str) -> TableStateStore {
        TableStateStore::new(Arc::new(FailingStore), storage_key)
    }

    pub fn shared(storage_key: &str) -> (Arc<MemoryStore>, TableStateStore) {
        let backend = Arc::new(MemoryStore::new());
        let store = TableStateStore::new(backend.clone(), storage_key);
        (backend, store)
    }
}
