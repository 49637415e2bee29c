use stratum_core::{
    DatabaseConfig, DatabaseDriver, Dialect, Result, SchemaCache, SchemaOp, shared_driver,
};

use super::recording_driver::RecordingDriver;

/// Offline dialect for controller and model tests: emits one marker
/// statement per operation so ordering is observable without SQL.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeDialect;

impl Dialect for FakeDialect {
    fn name(&self) -> &str {
        "fake"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }

    fn map_type(&self, data_type: &str, _size: u32, _scale: u32, _auto_increment: bool) -> String {
        data_type.to_uppercase()
    }

    fn emit(&self, op: &SchemaOp<'_>, _cache: &SchemaCache) -> Result<Vec<String>> {
        Ok(vec![format!("-- {} {}", op.kind(), op.target())])
    }

    fn table_exists_probe(&self, table: &str) -> String {
        format!("PROBE {table}")
    }

    fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE {table};")
    }

    fn connect(&self, _config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>> {
        Ok(Box::new(RecordingDriver::default()))
    }
}

/// Convenience: a recording driver plus the shared handle the manager
/// takes, with the recorder kept for assertions.
pub fn recording_pair() -> (RecordingDriver, stratum_core::SharedDriver) {
    let driver = RecordingDriver::default();
    let recorder = driver.clone();
    (recorder, shared_driver(Box::new(driver)))
}
