mod driver;
mod generator;
mod type_map;

use stratum_core::{
    DatabaseConfig, DatabaseDriver, Dialect, Result, SchemaCache, SchemaOp, TransactionConfig,
};

pub const DIALECT_NAME: &str = "sqlite";

/// SQLite dialect: double-quoted identifiers, `INTEGER PRIMARY KEY`
/// auto-increment, foreign keys only at table creation, and column
/// drops/renames emulated by table recreation from the in-process
/// schema cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        DIALECT_NAME
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn map_type(&self, data_type: &str, size: u32, scale: u32, auto_increment: bool) -> String {
        type_map::map_type(data_type, size, scale, auto_increment)
    }

    fn emit(&self, op: &SchemaOp<'_>, cache: &SchemaCache) -> Result<Vec<String>> {
        generator::emit(self, op, cache)
    }

    fn table_exists_probe(&self, table: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '{}';",
            table.replace('\'', "''")
        )
    }

    /// SQLite has no isolation levels; the batch is bracketed with a
    /// plain BEGIN/COMMIT.
    fn wrap_in_transaction(
        &self,
        statements: Vec<String>,
        _transaction: Option<&TransactionConfig>,
    ) -> Vec<String> {
        let mut wrapped = vec!["BEGIN;".to_string()];
        wrapped.extend(statements);
        wrapped.push("COMMIT;".to_string());
        wrapped
    }

    fn truncate_table(&self, table: &str) -> String {
        format!("DELETE FROM {};", self.quote_ident(table))
    }

    fn connect(&self, config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>> {
        driver::connect(config)
    }
}
