//! Catalog state and transactional mutation.
//!
//! [`Catalog`] is the in-memory registry of committed entries, keyed by
//! canonical name. [`CatalogService`] owns it together with the naming
//! grammar and the backing store; all mutation goes through a
//! [`UnitOfWork`] checked out from the service, which stages changes,
//! validates the post-mutation view, and commits or rolls back as a unit.

mod service;
mod uow;
mod validate;

pub use service::CatalogService;
pub use uow::UnitOfWork;

use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::entry::CatalogEntry;

/// In-memory entry registry keyed by canonical name.
pub struct Catalog {
    entries: DashMap<String, CatalogEntry>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert or replace an entry under its own name.
    pub fn insert(&self, entry: CatalogEntry) {
        self.entries.insert(entry.name().to_owned(), entry);
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<CatalogEntry> {
        self.entries.get(name).map(|r| r.value().clone())
    }

    /// Remove an entry, returning it if present.
    pub fn remove(&self, name: &str) -> Option<CatalogEntry> {
        self.entries.remove(name).map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entry names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.entries.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// A sorted, owned copy of the whole catalog. Validation and unit-of-work
    /// views build on this.
    pub fn snapshot(&self) -> BTreeMap<String, CatalogEntry> {
        self.entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").field("count", &self.len()).finish()
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
    fn insert_get_remove() {
        let catalog = Catalog::new();
        catalog.insert(entry("plasma_current"));
        assert!(catalog.contains("plasma_current"));
        assert_eq!(
            catalog.get("plasma_current").map(|e| e.name().to_owned()),
            Some("plasma_current".to_owned())
        );
        assert!(catalog.remove("plasma_current").is_some());
        assert!(catalog.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let catalog = Catalog::new();
        catalog.insert(entry("loop_voltage"));
        catalog.insert(entry("electron_temperature"));
        catalog.insert(entry("plasma_current"));
        assert_eq!(
            catalog.names(),
            ["electron_temperature", "loop_voltage", "plasma_current"]
        );
    }

    #[test]
    fn snapshot_is_a_point_in_time_copy() {
        let catalog = Catalog::new();
        catalog.insert(entry("plasma_current"));
        let snapshot = catalog.snapshot();
        catalog.remove("plasma_current");
        assert!(snapshot.contains_key("plasma_current"));
        assert!(catalog.is_empty());
    }
}
