use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use super::{HistoryEntry, HistoryStore};
use crate::{Error, Result};

/// JSON-array history backend. Writes go through a sibling temp file
/// and a rename so a crashed run never leaves a truncated log.
/// Concurrent writers are not handled here; the process lock provides
/// the cooperation.
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Vec<HistoryEntry>> {
        let raw =
            fs::read_to_string(&self.path).map_err(|source| Error::io(&self.path, source))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| {
            Error::parse(
                self.path.display().to_string(),
                source.line(),
                source.column(),
                source.to_string(),
            )
        })
    }

    fn write_entries(&self, entries: &[HistoryEntry]) -> Result<()> {
        let rendered = serde_json::to_string_pretty(entries)
            .map_err(|source| Error::invalid_input(source.to_string()))?;
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, rendered).map_err(|source| Error::io(&temp, source))?;
        fs::rename(&temp, &self.path).map_err(|source| Error::io(&self.path, source))
    }
}

impl HistoryStore for FileHistoryStore {
    fn validate_storage(&mut self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| Error::io(parent, source))?;
        }
        fs::write(&self.path, "[]").map_err(|source| Error::io(&self.path, source))
    }

    fn save(&mut self, entry: &HistoryEntry) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.push(entry.clone());
        self.write_entries(&entries)
    }

    fn load(&mut self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        self.read_entries()
    }

    fn rollback(&mut self, entries: &[HistoryEntry]) -> Result<()> {
        let removed: HashSet<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
        let remaining: Vec<HistoryEntry> = self
            .read_entries()?
            .into_iter()
            .filter(|entry| !removed.contains(entry.name.as_str()))
            .collect();
        self.write_entries(&remaining)
    }
}
