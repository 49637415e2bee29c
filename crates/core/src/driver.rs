use std::sync::{Arc, Mutex};

use crate::{NamedArgs, Result, TransactionConfig};

/// Driver contract over one owned connection. `apply` is transactional:
/// every statement (split first, see `split_statements`) executes in
/// order inside one client transaction; the first failure rolls back
/// and surfaces the error verbatim. `named_args` binds to the first
/// statement only, matching the seed engine's one-insert-per-call flow.
pub trait DatabaseDriver: Send {
    fn name(&self) -> &str;

    fn apply(
        &mut self,
        statements: &[String],
        named_args: Option<&NamedArgs>,
        transaction: Option<&TransactionConfig>,
    ) -> Result<()>;

    /// Runs a read query whose columns are already text-cast, returning
    /// rows of optional strings. Backs history loads and existence
    /// probes.
    fn query_strings(&mut self, sql: &str) -> Result<Vec<Vec<Option<String>>>>;
}

/// One logical run owns one connection; the manager and the database
/// history backend share it through this handle.
pub type SharedDriver = Arc<Mutex<Box<dyn DatabaseDriver>>>;

pub fn shared_driver(driver: Box<dyn DatabaseDriver>) -> SharedDriver {
    Arc::new(Mutex::new(driver))
}

/// Interprets a probe result column: empty, `0`, `f`, `false`, and SQL
/// NULL are falsy; anything else is truthy.
pub fn is_truthy(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(raw) => {
            let trimmed = raw.trim();
            !(trimmed.is_empty()
                || trimmed == "0"
                || trimmed.eq_ignore_ascii_case("f")
                || trimmed.eq_ignore_ascii_case("false"))
        }
    }
}
