mod driver;
mod generator;
mod type_map;

use stratum_core::{
    DatabaseConfig, DatabaseDriver, Dialect, Result, SchemaCache, SchemaOp,
};

pub const DIALECT_NAME: &str = "postgres";

/// PostgreSQL dialect: double-quoted identifiers, SERIAL/BIGSERIAL
/// auto-increment, and the full operation surface (schemas, enum types,
/// row policies, materialized views, object renames).
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
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
            "SELECT CAST(COUNT(*) AS TEXT) FROM information_schema.tables WHERE table_name = '{}';",
            table.replace('\'', "''")
        )
    }

    fn truncate_table(&self, table: &str) -> String {
        format!(
            "TRUNCATE TABLE {} RESTART IDENTITY CASCADE;",
            self.quote_ident(table)
        )
    }

    fn connect(&self, config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>> {
        driver::connect(config)
    }
}
