use super::operation::Operation;
use crate::{Dialect, Error, Result, SchemaCache};

/// A named, versioned, file-backed bundle of up/down operations.
/// Identity is the name; applied migrations are immutable (a checksum
/// mismatch against history is drift).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Migration {
    pub name: String,
    pub version: String,
    pub description: String,
    pub connection: Option<String>,
    pub driver: Option<String>,
    pub disable: bool,
    pub transaction: Vec<TransactionConfig>,
    pub validate: Vec<ValidationHooks>,
    pub up: Operation,
    pub down: Operation,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionConfig {
    pub isolation_level: Option<String>,
}

/// Opaque pre/post apply check labels. A label containing `fail`
/// (case-insensitive) signals failure; anything else passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationHooks {
    pub pre_up_checks: Vec<String>,
    pub post_up_checks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Migration {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn operation(&self, direction: Direction) -> &Operation {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    /// Generates the ordered statement list for one direction.
    pub fn to_sql(
        &self,
        dialect: &dyn Dialect,
        direction: Direction,
        cache: &SchemaCache,
    ) -> Result<Vec<String>> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_input("migration name must not be empty"));
        }
        self.operation(direction).to_sql(dialect, cache)
    }

    /// First transaction config, if any; later entries are carried but
    /// only the first drives execution.
    pub fn transaction_config(&self) -> Option<&TransactionConfig> {
        self.transaction.first()
    }
}
