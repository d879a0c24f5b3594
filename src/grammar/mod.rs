//! Naming grammar: segment model, compose, and parse.
//!
//! A standard name is a sequence of tokens drawn from ordered grammar
//! segments (direction, species, base quantity, location, mechanism).
//! [`GrammarSpec`] holds the compiled segment model loaded from TOML;
//! [`Grammar`] composes a [`StructuredName`] into its canonical string form
//! and parses such strings back, enforcing segment order, templates,
//! mutual exclusivity, and generic-base qualification.
//!
//! ```text
//! StructuredName ──compose──→ "radial_component_of_electron_heat_flux"
//!        ↑                                    │
//!        └────────────────parse───────────────┘
//! ```

mod engine;
mod name;
mod spec;

pub use engine::Grammar;
pub use name::StructuredName;
pub use spec::{GrammarSpec, Segment, Template, Vocabulary};
