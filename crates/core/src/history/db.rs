use std::sync::{Arc, PoisonError};

use tracing::debug;

use super::{HistoryEntry, HistoryStore, format_applied_at, parse_applied_at};
use crate::{
    CreateTable, Dialect, Error, Field, Result, SchemaCache, SchemaOp, SharedDriver, SqlValue,
    driver::is_truthy,
};

/// Database-backed history. Shares the manager's connection and keeps
/// its own table (default `migrations`), created on demand through the
/// engine's own DDL generation.
pub struct DbHistoryStore {
    driver: SharedDriver,
    dialect: Arc<dyn Dialect>,
    table: String,
}

impl DbHistoryStore {
    pub fn new(driver: SharedDriver, dialect: Arc<dyn Dialect>, table: impl Into<String>) -> Self {
        Self {
            driver,
            dialect,
            table: table.into(),
        }
    }

    fn with_driver<T>(
        &self,
        run: impl FnOnce(&mut dyn crate::DatabaseDriver) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        run(guard.as_mut())
    }

    fn table_exists(&self) -> Result<bool> {
        let probe = self.dialect.table_exists_probe(&self.table);
        let rows = self.with_driver(|driver| driver.query_strings(&probe))?;
        Ok(rows
            .first()
            .and_then(|row| row.first())
            .is_some_and(|value| is_truthy(value.as_deref())))
    }

    fn create_table(&self) -> Result<()> {
        let schema = history_table_schema(&self.table);
        let cache = SchemaCache::default();
        let statements = self
            .dialect
            .emit(&SchemaOp::CreateTable(&schema), &cache)?;
        self.with_driver(|driver| driver.apply(&statements, None, None))
    }
}

impl HistoryStore for DbHistoryStore {
    fn validate_storage(&mut self) -> Result<()> {
        if self.table_exists()? {
            return Ok(());
        }
        debug!(table = %self.table, "creating migration history table");
        self.create_table()
    }

    fn save(&mut self, entry: &HistoryEntry) -> Result<()> {
        let columns = [
            "name".to_string(),
            "version".to_string(),
            "description".to_string(),
            "checksum".to_string(),
            "applied_at".to_string(),
        ];
        let values = vec![
            SqlValue::Text(entry.name.clone()),
            SqlValue::Text(entry.version.clone()),
            SqlValue::Text(entry.description.clone()),
            SqlValue::Text(entry.checksum.clone()),
            SqlValue::Text(format_applied_at(&entry.applied_at)),
        ];
        let (sql, args) = self.dialect.insert_named(&self.table, &columns, values);
        self.with_driver(|driver| driver.apply(&[sql], Some(&args), None))
    }

    fn load(&mut self) -> Result<Vec<HistoryEntry>> {
        let select = self.dialect.history_select(&self.table);
        let rows = self.with_driver(|driver| driver.query_strings(&select))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(decode_entry(&row)?);
        }
        Ok(entries)
    }

    fn rollback(&mut self, entries: &[HistoryEntry]) -> Result<()> {
        let delete = self.dialect.history_delete(&self.table);
        for entry in entries.iter().rev() {
            let mut args = crate::NamedArgs::new();
            args.insert("name".to_string(), SqlValue::Text(entry.name.clone()));
            self.with_driver(|driver| driver.apply(&[delete.clone()], Some(&args), None))?;
        }
        Ok(())
    }
}

/// Fixed layout of the history table, expressed in the engine's own
/// schema model so every dialect renders it natively.
pub(crate) fn history_table_schema(table: &str) -> CreateTable {
    CreateTable {
        name: table.to_string(),
        fields: vec![
            Field {
                auto_increment: true,
                primary_key: true,
                ..Field::new("id", "integer")
            },
            Field {
                size: 200,
                index: true,
                ..Field::new("name", "string")
            },
            Field {
                size: 10,
                ..Field::new("version", "string")
            },
            Field {
                size: 500,
                nullable: true,
                ..Field::new("description", "string")
            },
            Field {
                size: 100,
                ..Field::new("checksum", "string")
            },
            Field::new("applied_at", "timestamp"),
        ],
        primary_key: Vec::new(),
    }
}

fn decode_entry(row: &[Option<String>]) -> Result<HistoryEntry> {
    let column = |index: usize| -> Result<String> {
        row.get(index)
            .cloned()
            .flatten()
            .ok_or_else(|| Error::invalid_input("malformed migration history row"))
    };

    Ok(HistoryEntry {
        name: column(0)?,
        version: column(1)?,
        description: row.get(2).cloned().flatten().unwrap_or_default(),
        checksum: column(3)?,
        applied_at: parse_applied_at(&column(4)?)?,
    })
}
