//! Dependency extraction and batch ordering.
//!
//! Dependency edges are never stored: they are recomputed on demand from an
//! entry's component map and provenance record. [`insertion_order`] uses
//! them to arrange a batch so that every entry lands after the entries it
//! requires, which is what a referential-integrity-checked destination needs
//! to accept a bulk insert.

use std::collections::BTreeSet;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::entry::CatalogEntry;
use crate::error::OrderingError;

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// What one entry requires, split into resolvable and dangling references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Referenced names the caller knows about.
    pub requires: BTreeSet<String>,
    /// Referenced names the caller does not know about. Reported, never
    /// silently dropped, and never turned into graph edges.
    pub dangling: BTreeSet<String>,
}

impl Dependencies {
    pub fn is_empty(&self) -> bool {
        self.requires.is_empty() && self.dangling.is_empty()
    }
}

/// Computes everything `entry` requires: component entries for vector kinds,
/// the provenance base for operator and reduction records, and the full
/// dependency list for expression records. `is_known` decides which side of
/// the split each reference falls on. Pure function, no I/O.
pub fn dependencies(
    entry: &CatalogEntry,
    is_known: impl Fn(&str) -> bool,
) -> Dependencies {
    let mut deps = Dependencies::default();
    let mut record = |name: &str| {
        if is_known(name) {
            deps.requires.insert(name.to_owned());
        } else {
            deps.dangling.insert(name.to_owned());
        }
    };
    if let Some(components) = entry.components() {
        for component in components.values() {
            record(component);
        }
    }
    if let Some(provenance) = entry.provenance() {
        for referenced in provenance.referenced_entries() {
            record(referenced);
        }
    }
    deps
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Orders `entries` so every dependency precedes its dependents.
///
/// References that leave the batch are ignored here; resolving them against
/// the full catalog is validation's concern. The result is a function of the
/// entry set alone: among equally ready entries the lexicographically
/// smallest name goes first, so callers get the same order regardless of
/// input order.
pub fn insertion_order(
    entries: &[CatalogEntry],
) -> Result<Vec<String>, OrderingError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: std::collections::HashMap<&str, NodeIndex> =
        std::collections::HashMap::with_capacity(entries.len());
    for entry in entries {
        let name = entry.name();
        if index.contains_key(name) {
            return Err(OrderingError::DuplicateName {
                name: name.to_owned(),
            });
        }
        index.insert(name, graph.add_node(name));
    }

    for entry in entries {
        let deps = dependencies(entry, |name| index.contains_key(name));
        for required in &deps.requires {
            graph.add_edge(index[required.as_str()], index[entry.name()], ());
        }
    }

    // Kahn's algorithm with an ordered ready set for a canonical result.
    let mut in_degree = vec![0usize; graph.node_count()];
    for edge in graph.raw_edges() {
        in_degree[edge.target().index()] += 1;
    }
    let mut ready: BTreeSet<&str> = graph
        .node_indices()
        .filter(|ix| in_degree[ix.index()] == 0)
        .map(|ix| graph[ix])
        .collect();

    let mut order = Vec::with_capacity(entries.len());
    while let Some(name) = ready.pop_first() {
        order.push(name.to_owned());
        for successor in graph.neighbors(index[name]) {
            in_degree[successor.index()] -= 1;
            if in_degree[successor.index()] == 0 {
                ready.insert(graph[successor]);
            }
        }
    }

    if order.len() < graph.node_count() {
        let mut members = BTreeSet::new();
        for component in tarjan_scc(&graph) {
            let cyclic = component.len() > 1
                || graph.contains_edge(component[0], component[0]);
            if cyclic {
                members.extend(
                    component.iter().map(|ix| graph[*ix].to_owned()),
                );
            }
        }
        return Err(OrderingError::Cycle {
            members: members.into_iter().collect(),
        });
    }
    Ok(order)
}

/// Orders `entries` so every dependent is removed before what it requires.
/// The exact reverse of [`insertion_order`].
pub fn removal_order(
    entries: &[CatalogEntry],
) -> Result<Vec<String>, OrderingError> {
    let mut order = insertion_order(entries)?;
    order.reverse();
    Ok(order)
}
