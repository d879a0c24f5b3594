//! The catalog service: one grammar, one in-memory catalog, one store.

use crate::catalog::Catalog;
use crate::catalog::uow::UnitOfWork;
use crate::catalog::validate::validate_view;
use crate::entry::CatalogEntry;
use crate::error::{CatalogError, Issue};
use crate::grammar::Grammar;
use crate::store::CatalogStore;

/// Owns a catalog together with the grammar its names obey and the store it
/// persists to. All mutation goes through [`begin`](Self::begin), which
/// borrows the service exclusively for the lifetime of the unit of work.
pub struct CatalogService<S: CatalogStore> {
    grammar: Grammar,
    catalog: Catalog,
    store: S,
}

impl<S: CatalogStore> CatalogService<S> {
    /// Opens a service over `store`, loading every persisted entry into
    /// memory. Entries are loaded as found; run [`validate`](Self::validate)
    /// to audit a store of unknown provenance.
    pub fn open(grammar: Grammar, store: S) -> Result<Self, CatalogError> {
        let catalog = Catalog::new();
        for entry in store.list()? {
            catalog.insert(entry);
        }
        tracing::info!(entries = catalog.len(), "opened catalog service");
        Ok(Self {
            grammar,
            catalog,
            store,
        })
    }

    /// Starts a unit of work.
    pub fn begin(&mut self) -> UnitOfWork<'_, S> {
        UnitOfWork::new(self)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub(super) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(super) fn store(&self) -> &S {
        &self.store
    }

    // -- reads --------------------------------------------------------------

    pub fn get(&self, name: &str) -> Option<CatalogEntry> {
        self.catalog.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// All entry names in lexicographic order.
    pub fn list_names(&self) -> Vec<String> {
        self.catalog.names()
    }

    /// All entries, ordered by name.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.catalog.snapshot().into_values().collect()
    }

    /// Validates the committed catalog as it stands.
    pub fn validate(&self) -> Vec<Issue> {
        validate_view(&self.catalog.snapshot(), &self.grammar)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
