//! SQLite store with in-memory cache.

use std::path::Path;
use std::sync::Mutex;

use dashmap::DashMap;
use rusqlite::{params, Connection, OptionalExtension};

use super::KeyValueStore;
use crate::error::StoreError;

/// SQLite-backed layout storage with DashMap cache.
///
/// Reads are served from the cache after the first hit; writes go to the
/// database first and update the cache only once they succeed.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    cache: DashMap<String, String>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Open a store that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS layout (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            cache: DashMap::new(),
        })
    }

    /// Get all keys matching a prefix.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{}%", prefix);
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM layout WHERE key LIKE ? ORDER BY key")?;
        let rows = stmt.query_map([&pattern], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::unavailable("connection lock poisoned"))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        // Check cache first
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        let result: Option<String> = self
            .lock()?
            .query_row("SELECT value FROM layout WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }

        Ok(result)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.execute(
            "INSERT INTO layout (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;

        self.cache.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?
            .execute("DELETE FROM layout WHERE key = ?", [key])?;
        self.cache.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_keys_with_prefix() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("pagination-users", "25").unwrap();
        store.set("pagination-logs", "50").unwrap();
        store.set("users-order", "[]").unwrap();

        assert_eq!(
            store.keys_with_prefix("pagination-").unwrap(),
            vec!["pagination-logs".to_string(), "pagination-users".to_string()]
        );
    }

    #[test]
    fn test_reads_survive_cache_miss() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("k", "v").unwrap();
        store.cache.clear();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
