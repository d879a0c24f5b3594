// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # nomenclator
//!
//! A catalog engine for fusion-plasma standard names: machine-readable
//! quantity names are composed from and parsed into grammar segments, carried
//! by validated catalog entries, and mutated through transactional units of
//! work with undo.
//!
//! ## Architecture
//!
//! - **Grammar engine** (`grammar`): fixed-order segment composition and parsing, driven by a TOML spec
//! - **Entry model** (`entry`): tagged scalar/vector/metadata documents with units and provenance
//! - **Provenance checks** (`provenance`): operator-chain and reduction prefixes must agree with declarations
//! - **Dependency ordering** (`deps`): petgraph-backed insertion and removal sequencing
//! - **Transactional catalog** (`catalog`): staged units of work, whole-catalog validation, undo and rollback
//! - **Storage** (`store`): in-memory and JSON-document backends behind one trait
//!
//! ## Library usage
//!
//! ```no_run
//! use nomenclator::catalog::CatalogService;
//! use nomenclator::entry::CatalogEntry;
//! use nomenclator::grammar::Grammar;
//! use nomenclator::store::JsonStore;
//! use nomenclator::unit::Unit;
//!
//! let store = JsonStore::open("catalog").unwrap();
//! let mut service = CatalogService::open(Grammar::default(), store).unwrap();
//! let mut work = service.begin();
//! work.add(CatalogEntry::scalar(
//!     "electron_temperature",
//!     "Electron temperature.",
//!     Unit::parse("eV").unwrap(),
//! ))
//! .unwrap();
//! work.commit().unwrap();
//! ```

pub mod catalog;
pub mod deps;
pub mod entry;
pub mod error;
pub mod grammar;
pub mod provenance;
pub mod store;
pub mod token;
pub mod unit;
