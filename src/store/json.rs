//! One-file-per-entry JSON store.
//!
//! Layout mirrors a reviewable catalog repository: an entry with tags lives
//! at `<root>/<first tag>/<name>.json`, an untagged one at
//! `<root>/<name>.json`. Documents are pretty-printed so they diff well
//! under version control.

use std::fs;
use std::path::{Path, PathBuf};

use crate::entry::CatalogEntry;
use crate::error::StoreError;
use crate::store::{CatalogStore, StoreResult};

/// File-per-entry store rooted at a single directory.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io { source })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `entry` belongs given its current tags.
    fn document_path(&self, entry: &CatalogEntry) -> PathBuf {
        let file = format!("{}.json", entry.name());
        match entry.header().tags.first() {
            Some(tag) => self.root.join(tag).join(file),
            None => self.root.join(file),
        }
    }

    /// Finds the existing document for `name`, whichever directory its tag
    /// placed it in. The layout is one level deep at most.
    fn find(&self, name: &str) -> StoreResult<Option<PathBuf>> {
        let file = format!("{name}.json");
        let direct = self.root.join(&file);
        if direct.is_file() {
            return Ok(Some(direct));
        }
        for dir_entry in
            fs::read_dir(&self.root).map_err(|source| StoreError::Io { source })?
        {
            let dir_entry =
                dir_entry.map_err(|source| StoreError::Io { source })?;
            let path = dir_entry.path();
            if path.is_dir() {
                let candidate = path.join(&file);
                if candidate.is_file() {
                    return Ok(Some(candidate));
                }
            }
        }
        Ok(None)
    }

    fn read_document(path: &Path) -> StoreResult<CatalogEntry> {
        let raw =
            fs::read_to_string(path).map_err(|source| StoreError::Io { source })?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Serde {
            message: format!("bad entry document {}: {e}", path.display()),
        })
    }
}

impl CatalogStore for JsonStore {
    fn write(&self, entry: &CatalogEntry) -> StoreResult<()> {
        let target = self.document_path(entry);
        // a retag moves the document; drop the copy at the old location
        if let Some(existing) = self.find(entry.name())? {
            if existing != target {
                fs::remove_file(&existing)
                    .map_err(|source| StoreError::Io { source })?;
            }
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| StoreError::Io { source })?;
        }
        let mut doc =
            serde_json::to_string_pretty(entry).map_err(|e| StoreError::Serde {
                message: format!("failed to serialize {:?}: {e}", entry.name()),
            })?;
        doc.push('\n');
        fs::write(&target, doc).map_err(|source| StoreError::Io { source })
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        match self.find(name)? {
            Some(path) => {
                fs::remove_file(&path).map_err(|source| StoreError::Io { source })
            }
            None => Err(StoreError::Missing {
                name: name.to_owned(),
            }),
        }
    }

    fn list(&self) -> StoreResult<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        let mut dirs = vec![self.root.clone()];
        while let Some(dir) = dirs.pop() {
            for dir_entry in
                fs::read_dir(&dir).map_err(|source| StoreError::Io { source })?
            {
                let path = dir_entry
                    .map_err(|source| StoreError::Io { source })?
                    .path();
                if path.is_dir() && dir == self.root {
                    dirs.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    entries.push(Self::read_document(&path)?);
                }
            }
        }
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }
}
