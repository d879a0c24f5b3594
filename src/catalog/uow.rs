//! Transactional mutation of the catalog.
//!
//! A [`UnitOfWork`] stages every mutation in an overlay keyed by entry name;
//! the underlying catalog is never touched until [`commit`]. Each staged
//! operation pushes one inverse record onto an undo stack, so [`undo_last`]
//! and [`rollback`] replay inverses instead of diffing state. Dropping an
//! open unit of work discards the overlay, which is the same outcome as a
//! rollback.
//!
//! [`commit`]: UnitOfWork::commit
//! [`undo_last`]: UnitOfWork::undo_last

use std::collections::BTreeMap;

use crate::catalog::service::CatalogService;
use crate::catalog::validate::validate_view;
use crate::deps::{insertion_order, removal_order};
use crate::entry::CatalogEntry;
use crate::error::{CatalogError, Issue};
use crate::store::CatalogStore;

/// What the overlay says about one name. Absent means untouched.
#[derive(Debug, Clone)]
enum StageSlot {
    /// Will be created on commit; the name is not in the base catalog.
    New(CatalogEntry),
    /// Replaces an entry that exists in the base catalog.
    Modified(CatalogEntry),
    /// Hides a base entry; the carried value is the base version, kept for
    /// dependency ordering of the eventual store deletion.
    Deleted(CatalogEntry),
}

impl StageSlot {
    fn visible(&self) -> Option<&CatalogEntry> {
        match self {
            StageSlot::New(entry) | StageSlot::Modified(entry) => Some(entry),
            StageSlot::Deleted(_) => None,
        }
    }
}

/// Inverse record for one staged operation. A rename counts as a single
/// operation even though it moves two slots.
#[derive(Debug)]
enum UndoOp {
    Add { name: String },
    Update { name: String, prior: Option<StageSlot> },
    Delete { name: String, prior: Option<StageSlot> },
    Rename { old: String, prior: Option<StageSlot>, new: String },
}

/// An open transaction against a [`CatalogService`].
///
/// Holds the service exclusively for its lifetime, so there is never more
/// than one writer. Reads through the unit of work see the base catalog with
/// the staged overlay applied.
pub struct UnitOfWork<'a, S: CatalogStore> {
    service: &'a mut CatalogService<S>,
    stage: BTreeMap<String, StageSlot>,
    undo: Vec<UndoOp>,
    closed: bool,
}

impl<'a, S: CatalogStore> UnitOfWork<'a, S> {
    pub(super) fn new(service: &'a mut CatalogService<S>) -> Self {
        Self {
            service,
            stage: BTreeMap::new(),
            undo: Vec::new(),
            closed: false,
        }
    }

    // -- reads --------------------------------------------------------------

    /// Looks `name` up in the staged view.
    pub fn get(&self, name: &str) -> Option<CatalogEntry> {
        match self.stage.get(name) {
            Some(slot) => slot.visible().cloned(),
            None => self.service.catalog().get(name),
        }
    }

    /// Whether `name` exists in the staged view.
    pub fn contains(&self, name: &str) -> bool {
        match self.stage.get(name) {
            Some(slot) => slot.visible().is_some(),
            None => self.service.catalog().contains(name),
        }
    }

    /// Number of names with a staged change.
    pub fn pending(&self) -> usize {
        self.stage.len()
    }

    /// Whether this unit of work has been committed or rolled back.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // -- staged mutations ---------------------------------------------------

    /// Stages a new entry. Fails with [`CatalogError::AlreadyExists`] when
    /// the name is taken, either by the base catalog or by an earlier staged
    /// add or update. A name staged for deletion still counts as taken; use
    /// [`update`](Self::update) to replace a removed entry instead.
    pub fn add(&mut self, entry: CatalogEntry) -> Result<(), CatalogError> {
        self.ensure_open()?;
        entry.validate()?;
        let name = entry.name().to_owned();
        let staged_live = self
            .stage
            .get(&name)
            .is_some_and(|slot| slot.visible().is_some());
        if staged_live || self.service.catalog().contains(&name) {
            return Err(CatalogError::AlreadyExists { name });
        }
        self.stage.insert(name.clone(), StageSlot::New(entry));
        self.undo.push(UndoOp::Add { name });
        Ok(())
    }

    /// Stages a replacement for `name`. The entry may carry a different
    /// name, which turns the update into a rename: the old name is staged
    /// for deletion and the new one for creation, recorded as one undoable
    /// operation. Updating a name staged for deletion revives it.
    pub fn update(&mut self, name: &str, entry: CatalogEntry) -> Result<(), CatalogError> {
        self.ensure_open()?;
        entry.validate()?;
        let in_base = self.service.catalog().contains(name);
        let staged_new = matches!(self.stage.get(name), Some(StageSlot::New(_)));
        if !in_base && !staged_new {
            return Err(CatalogError::NotFound {
                name: name.to_owned(),
            });
        }
        if entry.name() != name {
            return self.stage_rename(name, entry);
        }
        let slot = if in_base {
            StageSlot::Modified(entry)
        } else {
            StageSlot::New(entry)
        };
        let prior = self.stage.insert(name.to_owned(), slot);
        self.undo.push(UndoOp::Update {
            name: name.to_owned(),
            prior,
        });
        Ok(())
    }

    /// Renames `old` to `new`, marking the renamed entry as deprecating its
    /// old name. One undoable operation.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), CatalogError> {
        self.ensure_open()?;
        let Some(mut entry) = self.get(old) else {
            return Err(CatalogError::NotFound {
                name: old.to_owned(),
            });
        };
        entry.header_mut().name = new.to_owned();
        entry.header_mut().deprecates = Some(old.to_owned());
        entry.validate()?;
        self.stage_rename(old, entry)
    }

    /// Stages the removal of `name`. The prior value is kept as the inverse,
    /// so an undo restores exactly what was visible before.
    pub fn remove(&mut self, name: &str) -> Result<(), CatalogError> {
        self.ensure_open()?;
        if !self.contains(name) {
            return Err(CatalogError::NotFound {
                name: name.to_owned(),
            });
        }
        let prior = match self.service.catalog().get(name) {
            Some(base) => self
                .stage
                .insert(name.to_owned(), StageSlot::Deleted(base)),
            None => self.stage.remove(name),
        };
        self.undo.push(UndoOp::Delete {
            name: name.to_owned(),
            prior,
        });
        Ok(())
    }

    /// Moves the visible entry from `old` to the name carried by `entry`.
    fn stage_rename(&mut self, old: &str, entry: CatalogEntry) -> Result<(), CatalogError> {
        let new = entry.name().to_owned();
        let new_staged_live = self
            .stage
            .get(&new)
            .is_some_and(|slot| slot.visible().is_some());
        if new_staged_live || self.service.catalog().contains(&new) {
            return Err(CatalogError::AlreadyExists { name: new });
        }
        let prior = match self.service.catalog().get(old) {
            Some(base) => self
                .stage
                .insert(old.to_owned(), StageSlot::Deleted(base)),
            None => self.stage.remove(old),
        };
        self.stage.insert(new.clone(), StageSlot::New(entry));
        self.undo.push(UndoOp::Rename {
            old: old.to_owned(),
            prior,
            new,
        });
        Ok(())
    }

    // -- undo and rollback --------------------------------------------------

    /// Reverts the most recent staged operation. Returns `Ok(false)` when
    /// there is nothing left to undo.
    pub fn undo_last(&mut self) -> Result<bool, CatalogError> {
        self.ensure_open()?;
        let Some(op) = self.undo.pop() else {
            return Ok(false);
        };
        self.replay(op);
        Ok(true)
    }

    /// Reverts every staged operation in reverse order and closes the unit
    /// of work. No validation runs; an inconsistent stage rolls back just as
    /// well as a clean one.
    pub fn rollback(&mut self) -> Result<(), CatalogError> {
        self.ensure_open()?;
        while let Some(op) = self.undo.pop() {
            self.replay(op);
        }
        debug_assert!(self.stage.is_empty(), "undo replay must empty the stage");
        self.closed = true;
        tracing::debug!("rolled back unit of work");
        Ok(())
    }

    fn replay(&mut self, op: UndoOp) {
        match op {
            UndoOp::Add { name } => {
                self.stage.remove(&name);
            }
            UndoOp::Update { name, prior } | UndoOp::Delete { name, prior } => {
                restore(&mut self.stage, name, prior);
            }
            UndoOp::Rename { old, prior, new } => {
                self.stage.remove(&new);
                restore(&mut self.stage, old, prior);
            }
        }
    }

    // -- validation and commit ----------------------------------------------

    /// Validates the staged view as a whole and reports every finding,
    /// blocking and advisory alike.
    pub fn validate(&self) -> Vec<Issue> {
        validate_view(&self.view(), self.service.grammar())
    }

    /// Validates, persists and applies the staged changes, then closes the
    /// unit of work.
    ///
    /// Any blocking finding aborts with [`CatalogError::ValidationFailed`]
    /// carrying the full issue list; the unit of work stays open so the
    /// caller can fix the stage and try again, or roll back. Store writes go
    /// out dependencies-first and deletions dependents-first. A store error
    /// also leaves the unit of work open with its undo stack intact; entries
    /// persisted before the failure are not unwound.
    pub fn commit(&mut self) -> Result<(), CatalogError> {
        self.ensure_open()?;
        let issues = self.validate();
        if issues.iter().any(Issue::is_blocking) {
            return Err(CatalogError::ValidationFailed { issues });
        }

        let mut writes: Vec<CatalogEntry> = Vec::new();
        let mut deletions: Vec<CatalogEntry> = Vec::new();
        for slot in self.stage.values() {
            match slot {
                StageSlot::New(entry) | StageSlot::Modified(entry) => {
                    writes.push(entry.clone());
                }
                StageSlot::Deleted(entry) => deletions.push(entry.clone()),
            }
        }
        let write_order = insertion_order(&writes)?;
        let delete_order = removal_order(&deletions)?;

        let by_name: BTreeMap<&str, &CatalogEntry> =
            writes.iter().map(|entry| (entry.name(), entry)).collect();
        for name in &write_order {
            if let Some(entry) = by_name.get(name.as_str()) {
                self.service.store().write(entry)?;
            }
        }
        for name in &delete_order {
            self.service.store().delete(name)?;
        }

        for (name, slot) in std::mem::take(&mut self.stage) {
            match slot {
                StageSlot::New(entry) | StageSlot::Modified(entry) => {
                    self.service.catalog().insert(entry);
                }
                StageSlot::Deleted(_) => {
                    self.service.catalog().remove(&name);
                }
            }
        }
        self.undo.clear();
        self.closed = true;
        tracing::info!(
            written = write_order.len(),
            deleted = delete_order.len(),
            "committed unit of work"
        );
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    fn ensure_open(&self) -> Result<(), CatalogError> {
        if self.closed {
            Err(CatalogError::Closed)
        } else {
            Ok(())
        }
    }

    /// The base catalog with the staged overlay applied.
    fn view(&self) -> BTreeMap<String, CatalogEntry> {
        let mut view = self.service.catalog().snapshot();
        for (name, slot) in &self.stage {
            match slot.visible() {
                Some(entry) => {
                    view.insert(name.clone(), entry.clone());
                }
                None => {
                    view.remove(name);
                }
            }
        }
        view
    }
}

fn restore(stage: &mut BTreeMap<String, StageSlot>, name: String, prior: Option<StageSlot>) {
    match prior {
        Some(slot) => {
            stage.insert(name, slot);
        }
        None => {
            stage.remove(&name);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
