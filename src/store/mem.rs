//! In-memory store backed by DashMap.
//!
//! The fastest possible backing store; everything is lost on drop. Used in
//! tests and for sessions that never need persistence.

use dashmap::DashMap;

use crate::entry::CatalogEntry;
use crate::error::StoreError;
use crate::store::{CatalogStore, StoreResult};

/// Concurrent in-memory store using a sharded hashmap.
#[derive(Debug)]
pub struct MemoryStore {
    entries: DashMap<String, CatalogEntry>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Whether a document for `name` is held.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore for MemoryStore {
    fn write(&self, entry: &CatalogEntry) -> StoreResult<()> {
        self.entries.insert(entry.name().to_owned(), entry.clone());
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        match self.entries.remove(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::Missing {
                name: name.to_owned(),
            }),
        }
    }

    fn list(&self) -> StoreResult<Vec<CatalogEntry>> {
        let mut entries: Vec<CatalogEntry> = self
            .entries
            .iter()
            .map(|r| r.value().clone())
            .collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry::scalar(name, "test quantity", Unit::dimensionless())
    }

    #[test]
    fn write_and_list() {
        let store = MemoryStore::new();
        store.write(&entry("plasma_current")).unwrap();
        store.write(&entry("electron_temperature")).unwrap();

        let listed = store.list().unwrap();
        let names: Vec<&str> = listed.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["electron_temperature", "plasma_current"]);
    }

    #[test]
    fn overwrite_replaces() {
        let store = MemoryStore::new();
        store.write(&entry("plasma_current")).unwrap();
        let replacement = CatalogEntry::scalar(
            "plasma_current",
            "Total toroidal plasma current.",
            Unit::parse("A").unwrap(),
        );
        store.write(&replacement).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.list().unwrap()[0], replacement);
    }

    #[test]
    fn delete_missing_is_an_error() {
        let store = MemoryStore::new();
        store.write(&entry("plasma_current")).unwrap();
        store.delete("plasma_current").unwrap();
        assert!(matches!(
            store.delete("plasma_current"),
            Err(StoreError::Missing { name }) if name == "plasma_current"
        ));
    }

    #[test]
    fn concurrent_writes() {
        use std::sync::Arc;
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.write(&entry(&format!("quantity_{i}"))).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 32);
    }
}
