//! Whole-catalog validation.
//!
//! Runs over a complete view of the catalog (committed entries with any
//! staged mutations applied) and collects [`Issue`]s instead of failing on
//! the first finding, so a failed commit can report everything at once.
//! Structural findings block a commit; advisory ones never do.

use std::collections::BTreeMap;

use crate::deps::{dependencies, insertion_order};
use crate::entry::{CatalogEntry, Status};
use crate::error::Issue;
use crate::grammar::Grammar;
use crate::provenance::{
    Provenance, ResultKind, enforce_operator_provenance,
    enforce_reduction_provenance,
};

/// Checks every entry in `view` against the grammar and against each other.
/// The result is deterministic: entries are visited in name order and the
/// checks within an entry run in a fixed sequence.
pub(super) fn validate_view(
    view: &BTreeMap<String, CatalogEntry>,
    grammar: &Grammar,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (name, entry) in view {
        check_entry(name, entry, view, grammar, &mut issues);
    }
    check_cycles(view, &mut issues);
    issues
}

fn check_entry(
    name: &str,
    entry: &CatalogEntry,
    view: &BTreeMap<String, CatalogEntry>,
    grammar: &Grammar,
    issues: &mut Vec<Issue>,
) {
    if let Err(err) = entry.validate() {
        issues.push(Issue::error(name, err.to_string()));
    }

    match grammar.parse(name) {
        Err(err) => {
            issues.push(Issue::error(
                name,
                format!("name is not derivable from the grammar: {err}"),
            ));
        }
        Ok(parsed) => {
            // A geometric base names a shape; the name must say whose.
            if let Some(token) = parsed.get("geometric_base") {
                if !parsed.contains("object") && !parsed.contains("geometry") {
                    issues.push(Issue::error(
                        name,
                        format!(
                            "geometric base {token:?} needs an anchoring \
                             object or geometry"
                        ),
                    ));
                }
            }
        }
    }

    let deps = dependencies(entry, |referenced| view.contains_key(referenced));
    for dangling in &deps.dangling {
        issues.push(Issue::error(
            name,
            format!("references missing entry {dangling:?}"),
        ));
    }
    for required in &deps.requires {
        let target = &view[required];
        if target.header().status == Status::Deprecated
            && matches!(entry.header().status, Status::Draft | Status::Active)
        {
            let successor = target
                .header()
                .superseded_by
                .as_deref()
                .unwrap_or("nothing");
            issues.push(Issue::advisory(
                name,
                format!(
                    "references deprecated entry {required:?} (superseded by \
                     {successor:?})"
                ),
            ));
        }
    }

    check_vector_links(name, entry, view, issues);
    check_provenance(name, entry, view, issues);
    check_lifecycle_links(name, entry, view, issues);
    check_tags(name, entry, grammar, issues);
}

/// Component maps must back-link: axis `radial` of vector `v` points at
/// `radial_component_of_v`, and that target must be a scalar kind. The same
/// goes for the declared magnitude entry.
fn check_vector_links(
    name: &str,
    entry: &CatalogEntry,
    view: &BTreeMap<String, CatalogEntry>,
    issues: &mut Vec<Issue>,
) {
    if let Some(components) = entry.components() {
        for (axis, component) in components {
            let expected = format!("{axis}_component_of_{name}");
            if component != &expected {
                issues.push(Issue::error(
                    name,
                    format!(
                        "component for axis {axis:?} must back-link as \
                         {expected:?}, found {component:?}"
                    ),
                ));
            }
            if let Some(target) = view.get(component) {
                if target.is_vector() || target.kind() == "metadata" {
                    issues.push(Issue::error(
                        name,
                        format!(
                            "component {component:?} must be a scalar entry, \
                             found a {}",
                            target.kind()
                        ),
                    ));
                }
            }
        }
    }
    if let Some(magnitude) = entry.magnitude() {
        match view.get(magnitude) {
            None => issues.push(Issue::error(
                name,
                format!("references missing magnitude entry {magnitude:?}"),
            )),
            Some(target) if target.is_vector() => issues.push(Issue::error(
                name,
                format!("magnitude entry {magnitude:?} must be a scalar kind"),
            )),
            Some(_) => {}
        }
    }
}

fn check_provenance(
    name: &str,
    entry: &CatalogEntry,
    view: &BTreeMap<String, CatalogEntry>,
    issues: &mut Vec<Issue>,
) {
    let Some(provenance) = entry.provenance() else {
        return;
    };
    let actual = if entry.is_vector() {
        ResultKind::Vector
    } else {
        ResultKind::Scalar
    };
    match provenance {
        Provenance::Operator {
            operators,
            base,
            operator_id,
        } => {
            if let Err(err) = enforce_operator_provenance(
                name,
                operators,
                base,
                operator_id.as_deref(),
                actual,
            ) {
                issues.push(Issue::error(name, err.to_string()));
            }
            // A spatial gradient divides by length; the unit should show it.
            if operators.iter().any(|op| op == "gradient") {
                let unit = entry.header().unit.as_str();
                if !unit.contains(".m") && !unit.contains("^-") {
                    issues.push(Issue::advisory(
                        name,
                        format!(
                            "unit {unit:?} of a gradient result has no \
                             per-length factor"
                        ),
                    ));
                }
            }
        }
        Provenance::Reduction {
            reduction,
            domain,
            base,
        } => {
            let is_vector_base = |base_name: &str| {
                view.get(base_name).is_some_and(CatalogEntry::is_vector)
            };
            if let Err(err) = enforce_reduction_provenance(
                name,
                reduction,
                domain,
                base,
                is_vector_base,
            ) {
                issues.push(Issue::error(name, err.to_string()));
            }
        }
        Provenance::Expression { .. } => {}
    }
}

/// `superseded_by` points forward at a live replacement; `deprecates` points
/// backward at a name that is usually gone, so only the former is checked.
fn check_lifecycle_links(
    name: &str,
    entry: &CatalogEntry,
    view: &BTreeMap<String, CatalogEntry>,
    issues: &mut Vec<Issue>,
) {
    if let Some(successor) = entry.header().superseded_by.as_deref() {
        if !successor.is_empty() && !view.contains_key(successor) {
            issues.push(Issue::error(
                name,
                format!("superseded_by references missing entry {successor:?}"),
            ));
        }
    }
}

fn check_tags(
    name: &str,
    entry: &CatalogEntry,
    grammar: &Grammar,
    issues: &mut Vec<Issue>,
) {
    if !grammar.spec().has_tags() {
        return;
    }
    let tags = &entry.header().tags;
    for tag in tags {
        if !grammar.spec().is_known_tag(tag) {
            issues.push(Issue::error(name, format!("unknown tag {tag:?}")));
        }
    }
    if let Some(first) = tags.first() {
        if grammar.spec().is_known_tag(first)
            && !grammar.spec().is_primary_tag(first)
        {
            issues.push(Issue::advisory(
                name,
                format!("first tag {first:?} is not a primary tag"),
            ));
        }
    }
}

fn check_cycles(view: &BTreeMap<String, CatalogEntry>, issues: &mut Vec<Issue>) {
    let entries: Vec<CatalogEntry> = view.values().cloned().collect();
    if let Err(err) = insertion_order(&entries) {
        if let crate::error::OrderingError::Cycle { members } = &err {
            let listed = members.join(", ");
            for member in members {
                issues.push(Issue::error(
                    member,
                    format!("participates in a dependency cycle: {listed}"),
                ));
            }
        } else {
            // duplicate names cannot happen in a keyed view
            issues.push(Issue::error("catalog", err.to_string()));
        }
    }
}
