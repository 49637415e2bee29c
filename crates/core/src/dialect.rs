use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::{
    CreateTable, DatabaseConfig, DatabaseDriver, Field, NamedArgs, Result, SchemaOp, SqlValue,
    TransactionConfig,
};

/// Dialect contract: pure SQL generation for every operation kind plus
/// the connection entry point. Generation never performs I/O; an
/// operation a dialect cannot express is a typed `Unsupported` error,
/// never a silent no-op.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &str;

    /// Identifier quoting: backticks on MySQL, double quotes elsewhere.
    fn quote_ident(&self, ident: &str) -> String;

    /// Portable type + size/scale/auto-increment to the dialect's
    /// native column type. Unknown names pass through verbatim.
    fn map_type(&self, data_type: &str, size: u32, scale: u32, auto_increment: bool) -> String;

    /// Single generation entry point; dispatches on the operation kind.
    fn emit(&self, op: &SchemaOp<'_>, cache: &SchemaCache) -> Result<Vec<String>>;

    /// Existence-check query returning a single text-cast truthy/falsy
    /// column.
    fn table_exists_probe(&self, table: &str) -> String;

    /// Brackets a statement list with the dialect's begin/commit,
    /// injecting the isolation level where the dialect supports one.
    /// Used for dry-run rendering; live execution drives the client
    /// library's transaction API instead.
    fn wrap_in_transaction(
        &self,
        statements: Vec<String>,
        transaction: Option<&TransactionConfig>,
    ) -> Vec<String> {
        let mut wrapped = vec!["BEGIN;".to_string()];
        if let Some(level) = transaction.and_then(|config| config.isolation_level.as_deref()) {
            wrapped.push(format!(
                "SET TRANSACTION ISOLATION LEVEL {};",
                level.to_uppercase()
            ));
        }
        wrapped.extend(statements);
        wrapped.push("COMMIT;".to_string());
        wrapped
    }

    /// Parameterised insert with `:col` placeholders, one per column.
    fn insert_named(
        &self,
        table: &str,
        columns: &[String],
        values: Vec<SqlValue>,
    ) -> (String, NamedArgs) {
        let column_list = columns
            .iter()
            .map(|column| self.quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = columns
            .iter()
            .map(|column| format!(":{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders});",
            self.quote_ident(table)
        );
        let args = columns.iter().cloned().zip(values).collect();
        (sql, args)
    }

    fn truncate_table(&self, table: &str) -> String;

    fn history_select(&self, table: &str) -> String {
        format!(
            "SELECT name, version, description, checksum, CAST(applied_at AS TEXT) FROM {} ORDER BY applied_at ASC, id ASC;",
            self.quote_ident(table)
        )
    }

    fn history_delete(&self, table: &str) -> String {
        format!(
            "DELETE FROM {} WHERE name = :name;",
            self.quote_ident(table)
        )
    }

    fn statement_terminator(&self) -> &str {
        ";"
    }

    fn connect(&self, config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>>;
}

/// In-process table-schema cache. SQLite cannot drop or rename columns
/// through `ALTER`, so its dialect recreates tables from the schema
/// observed at `CreateTable` time; the cache carries that state across
/// operations. One instance per manager, mutex-guarded.
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: Mutex<HashMap<String, CreateTable>>,
}

impl SchemaCache {
    pub fn record_create(&self, table: &CreateTable) {
        self.lock().insert(table.name.clone(), table.clone());
    }

    pub fn replace(&self, table: CreateTable) {
        self.lock().insert(table.name.clone(), table);
    }

    pub fn get(&self, name: &str) -> Option<CreateTable> {
        self.lock().get(name).cloned()
    }

    pub fn record_drop(&self, name: &str) {
        self.lock().remove(name);
    }

    pub fn record_rename(&self, from: &str, to: &str) {
        let mut tables = self.lock();
        if let Some(mut table) = tables.remove(from) {
            table.name = to.to_string();
            tables.insert(to.to_string(), table);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CreateTable>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Default-clause conversion shared by every dialect: the `now()`
/// sentinel becomes `CURRENT_TIMESTAMP`, `null` becomes `NULL`
/// (suppressed entirely on `NOT NULL` columns), unquoted literals on
/// portable string types are auto-quoted, and anything else is emitted
/// verbatim.
pub fn render_default(field: &Field) -> Option<String> {
    let raw = field.default.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.eq_ignore_ascii_case("now()") {
        return Some("CURRENT_TIMESTAMP".to_string());
    }
    if raw.eq_ignore_ascii_case("null") {
        if !field.nullable {
            return None;
        }
        return Some("NULL".to_string());
    }

    if is_string_type(&field.data_type) && !raw.starts_with('\'') {
        return Some(format!("'{}'", raw.replace('\'', "''")));
    }

    Some(raw.to_string())
}

pub fn is_string_type(data_type: &str) -> bool {
    matches!(
        data_type.to_ascii_lowercase().as_str(),
        "string" | "text" | "char" | "varchar"
    )
}

/// Scale for `DECIMAL(size, scale)`: defaults to 2 and never exceeds
/// the precision.
pub fn clamped_scale(size: u32, scale: u32) -> u32 {
    let scale = if scale == 0 { 2 } else { scale };
    scale.min(size)
}

pub fn unique_index_name(table: &str, column: &str) -> String {
    format!("uniq_{table}_{column}")
}

pub fn index_name(table: &str, column: &str) -> String {
    format!("idx_{table}_{column}")
}

pub fn foreign_key_name(column: &str) -> String {
    format!("fk_{column}")
}
