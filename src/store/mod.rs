//! Backing stores for the catalog.
//!
//! A store has exactly three jobs: write one entry document, delete one by
//! name, and list everything it holds. Two implementations cover the usual
//! cases:
//!
//! - [`MemoryStore`] — entries in a concurrent map, for tests and
//!   ephemeral sessions
//! - [`JsonStore`] — one pretty-printed JSON file per entry, grouped by
//!   leading tag, the layout a version-controlled catalog repository wants

pub mod json;
pub mod mem;

pub use json::JsonStore;
pub use mem::MemoryStore;

use crate::entry::CatalogEntry;
use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A destination the catalog persists entries to.
///
/// A committing unit of work calls `write` and `delete` strictly in
/// dependency-safe order: writes dependencies-first, deletes
/// dependents-first. Stores that enforce referential integrity can rely on
/// that.
pub trait CatalogStore {
    /// Inserts or replaces the document for `entry.name()`.
    fn write(&self, entry: &CatalogEntry) -> StoreResult<()>;

    /// Removes the document for `name`. Deleting a name the store does not
    /// hold is an error, not a no-op: it means the store and the in-memory
    /// catalog have diverged.
    fn delete(&self, name: &str) -> StoreResult<()>;

    /// Every document the store holds, sorted by name. Used to seed the
    /// in-memory catalog at startup.
    fn list(&self) -> StoreResult<Vec<CatalogEntry>>;
}
