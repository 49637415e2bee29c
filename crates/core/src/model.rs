mod migration;
mod objects;
mod operation;
mod table;

pub use migration::{Direction, Migration, TransactionConfig, ValidationHooks};
pub use objects::{
    CreateFunction, CreateProcedure, CreateTrigger, CreateView, DropEnumType, DropFunction,
    DropMaterializedView, DropProcedure, DropRowPolicy, DropSchema, DropTrigger, DropView,
    RenameFunction, RenameProcedure, RenameTrigger, RenameView, TriggerEvent, TriggerTiming,
};
pub use operation::{Operation, SchemaOp};
pub use table::{
    AlterTable, CreateTable, DeleteData, DropField, DropTable, Field, ForeignKey, RenameField,
    RenameTable,
};
