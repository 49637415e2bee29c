mod db;
mod file;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub use db::DbHistoryStore;
pub use file::FileHistoryStore;

use crate::{Error, Result};

/// One applied migration. Entries are appended in apply order and
/// removed from the tail on rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub version: String,
    pub description: String,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
}

pub trait HistoryStore: Send {
    /// Ensures the backing storage exists, creating it when missing.
    fn validate_storage(&mut self) -> Result<()>;

    fn save(&mut self, entry: &HistoryEntry) -> Result<()>;

    /// Entries in apply order.
    fn load(&mut self) -> Result<Vec<HistoryEntry>>;

    /// Removes the given tail entries.
    fn rollback(&mut self, entries: &[HistoryEntry]) -> Result<()>;
}

const APPLIED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_applied_at(applied_at: &DateTime<Utc>) -> String {
    applied_at.format(APPLIED_AT_FORMAT).to_string()
}

pub(crate) fn parse_applied_at(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in [APPLIED_AT_FORMAT, "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.and_utc());
        }
    }
    Err(Error::invalid_input(format!(
        "unreadable applied_at timestamp `{raw}` in migration history"
    )))
}
