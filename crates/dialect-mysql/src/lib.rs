mod driver;
mod generator;
mod type_map;

pub use driver::{is_ignorable_rollback_error, is_rollback_batch};

use stratum_core::{
    DatabaseConfig, DatabaseDriver, Dialect, Result, SchemaCache, SchemaOp, TransactionConfig,
};

pub const DIALECT_NAME: &str = "mysql";

/// MySQL dialect: backtick identifiers, `AUTO_INCREMENT`, column
/// renames through `CHANGE` (which requires a type), and typed errors
/// for the operation kinds MySQL cannot express (schemas, enum types,
/// row policies, materialized views, function/procedure/trigger
/// renames).
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        DIALECT_NAME
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn map_type(&self, data_type: &str, size: u32, scale: u32, auto_increment: bool) -> String {
        type_map::map_type(data_type, size, scale, auto_increment)
    }

    fn emit(&self, op: &SchemaOp<'_>, cache: &SchemaCache) -> Result<Vec<String>> {
        generator::emit(self, op, cache)
    }

    fn table_exists_probe(&self, table: &str) -> String {
        format!(
            "SELECT CAST(COUNT(*) AS CHAR) FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = '{}';",
            table.replace('\'', "''")
        )
    }

    fn wrap_in_transaction(
        &self,
        statements: Vec<String>,
        transaction: Option<&TransactionConfig>,
    ) -> Vec<String> {
        let mut wrapped = Vec::with_capacity(statements.len() + 3);
        if let Some(level) = transaction.and_then(|config| config.isolation_level.as_deref()) {
            wrapped.push(format!(
                "SET TRANSACTION ISOLATION LEVEL {};",
                level.to_uppercase()
            ));
        }
        wrapped.push("START TRANSACTION;".to_string());
        wrapped.extend(statements);
        wrapped.push("COMMIT;".to_string());
        wrapped
    }

    fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {};", self.quote_ident(table))
    }

    fn history_select(&self, table: &str) -> String {
        format!(
            "SELECT name, version, description, checksum, CAST(applied_at AS CHAR) FROM {} ORDER BY applied_at ASC, id ASC;",
            self.quote_ident(table)
        )
    }

    fn connect(&self, config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>> {
        driver::connect(config)
    }
}
