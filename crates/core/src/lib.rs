pub mod bcl;
mod checksum;
mod config;
mod dialect;
mod driver;
mod error;
mod history;
pub mod ident;
mod lock;
mod manager;
mod model;
mod scaffold;
pub mod seed;
mod splitter;
mod validate;
mod value;

pub use checksum::sha256_hex;
pub use config::{
    Config, DatabaseConfig, HistoryStoreKind, MigrationConfig, SeedConfig, ValidationConfig,
};
pub use dialect::{
    Dialect, SchemaCache, clamped_scale, foreign_key_name, index_name, is_string_type,
    render_default, unique_index_name,
};
pub use driver::{DatabaseDriver, SharedDriver, is_truthy, shared_driver};
pub use error::{Error, Result};
pub use history::{DbHistoryStore, FileHistoryStore, HistoryEntry, HistoryStore};
pub use ident::validate_identifier;
pub use lock::{LOCK_FILE_NAME, MigrationLock};
pub use manager::{ApplySummary, Manager, PendingReport, SeedRunOptions, SeedSummary};
pub use model::{
    AlterTable, CreateFunction, CreateProcedure, CreateTable, CreateTrigger, CreateView,
    DeleteData, Direction, DropEnumType, DropField, DropFunction, DropMaterializedView,
    DropProcedure, DropRowPolicy, DropSchema, DropTable, DropTrigger, DropView, Field, ForeignKey,
    Migration, Operation, RenameField, RenameFunction, RenameProcedure, RenameTable,
    RenameTrigger, RenameView, SchemaOp, TransactionConfig, TriggerEvent, TriggerTiming,
    ValidationHooks,
};
pub use scaffold::{create_migration_scaffold, create_seed_scaffold};
pub use seed::{RowInsert, Seed, SeedCondition, SeedEngine, SeedField};
pub use splitter::split_statements;
pub use validate::validate_migration;
pub use value::{NamedArgs, SqlValue, bind_positional};
