use super::objects::{
    CreateFunction, CreateProcedure, CreateTrigger, CreateView, DropEnumType, DropFunction,
    DropMaterializedView, DropProcedure, DropRowPolicy, DropSchema, DropTrigger, DropView,
    RenameFunction, RenameProcedure, RenameTrigger, RenameView,
};
use super::table::{AlterTable, CreateTable, DeleteData, DropTable, RenameTable};
use crate::{Dialect, Error, Result, SchemaCache};

/// A heterogeneous bundle of operation directives. Categories are
/// emitted in a fixed order so dependent objects stay consistent:
/// creates and alters first, data deletion, drops, renames, then views,
/// functions, procedures, and triggers. Within a category, items keep
/// source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub create_tables: Vec<CreateTable>,
    pub alter_tables: Vec<AlterTable>,
    pub delete_data: Vec<DeleteData>,
    pub drop_tables: Vec<DropTable>,
    pub drop_schemas: Vec<DropSchema>,
    pub drop_enum_types: Vec<DropEnumType>,
    pub drop_row_policies: Vec<DropRowPolicy>,
    pub drop_materialized_views: Vec<DropMaterializedView>,
    pub rename_tables: Vec<RenameTable>,
    pub create_views: Vec<CreateView>,
    pub drop_views: Vec<DropView>,
    pub rename_views: Vec<RenameView>,
    pub create_functions: Vec<CreateFunction>,
    pub drop_functions: Vec<DropFunction>,
    pub rename_functions: Vec<RenameFunction>,
    pub create_procedures: Vec<CreateProcedure>,
    pub drop_procedures: Vec<DropProcedure>,
    pub rename_procedures: Vec<RenameProcedure>,
    pub create_triggers: Vec<CreateTrigger>,
    pub drop_triggers: Vec<DropTrigger>,
    pub rename_triggers: Vec<RenameTrigger>,
}

impl Operation {
    pub fn is_empty(&self) -> bool {
        self.ops_in_order().is_empty()
    }

    /// Validates every directive and fans out to the dialect in the
    /// fixed category order.
    pub fn to_sql(&self, dialect: &dyn Dialect, cache: &SchemaCache) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for op in self.ops_in_order() {
            op.validate()?;
            statements.extend(dialect.emit(&op, cache)?);
        }
        Ok(statements)
    }

    pub fn ops_in_order(&self) -> Vec<SchemaOp<'_>> {
        let mut ops = Vec::new();
        ops.extend(self.create_tables.iter().map(SchemaOp::CreateTable));
        ops.extend(self.alter_tables.iter().map(SchemaOp::AlterTable));
        ops.extend(self.delete_data.iter().map(SchemaOp::DeleteData));
        ops.extend(self.drop_tables.iter().map(SchemaOp::DropTable));
        ops.extend(self.drop_schemas.iter().map(SchemaOp::DropSchema));
        ops.extend(self.drop_enum_types.iter().map(SchemaOp::DropEnumType));
        ops.extend(self.drop_row_policies.iter().map(SchemaOp::DropRowPolicy));
        ops.extend(
            self.drop_materialized_views
                .iter()
                .map(SchemaOp::DropMaterializedView),
        );
        ops.extend(self.rename_tables.iter().map(SchemaOp::RenameTable));
        ops.extend(self.create_views.iter().map(SchemaOp::CreateView));
        ops.extend(self.drop_views.iter().map(SchemaOp::DropView));
        ops.extend(self.rename_views.iter().map(SchemaOp::RenameView));
        ops.extend(self.create_functions.iter().map(SchemaOp::CreateFunction));
        ops.extend(self.drop_functions.iter().map(SchemaOp::DropFunction));
        ops.extend(self.rename_functions.iter().map(SchemaOp::RenameFunction));
        ops.extend(self.create_procedures.iter().map(SchemaOp::CreateProcedure));
        ops.extend(self.drop_procedures.iter().map(SchemaOp::DropProcedure));
        ops.extend(self.rename_procedures.iter().map(SchemaOp::RenameProcedure));
        ops.extend(self.create_triggers.iter().map(SchemaOp::CreateTrigger));
        ops.extend(self.drop_triggers.iter().map(SchemaOp::DropTrigger));
        ops.extend(self.rename_triggers.iter().map(SchemaOp::RenameTrigger));
        ops
    }
}

/// A borrowed view over one operation directive: the unit of dispatch
/// into a dialect's `emit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaOp<'a> {
    CreateTable(&'a CreateTable),
    AlterTable(&'a AlterTable),
    DeleteData(&'a DeleteData),
    DropTable(&'a DropTable),
    DropSchema(&'a DropSchema),
    DropEnumType(&'a DropEnumType),
    DropRowPolicy(&'a DropRowPolicy),
    DropMaterializedView(&'a DropMaterializedView),
    RenameTable(&'a RenameTable),
    CreateView(&'a CreateView),
    DropView(&'a DropView),
    RenameView(&'a RenameView),
    CreateFunction(&'a CreateFunction),
    DropFunction(&'a DropFunction),
    RenameFunction(&'a RenameFunction),
    CreateProcedure(&'a CreateProcedure),
    DropProcedure(&'a DropProcedure),
    RenameProcedure(&'a RenameProcedure),
    CreateTrigger(&'a CreateTrigger),
    DropTrigger(&'a DropTrigger),
    RenameTrigger(&'a RenameTrigger),
}

impl SchemaOp<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "CreateTable",
            Self::AlterTable(_) => "AlterTable",
            Self::DeleteData(_) => "DeleteData",
            Self::DropTable(_) => "DropTable",
            Self::DropSchema(_) => "DropSchema",
            Self::DropEnumType(_) => "DropEnumType",
            Self::DropRowPolicy(_) => "DropRowPolicy",
            Self::DropMaterializedView(_) => "DropMaterializedView",
            Self::RenameTable(_) => "RenameTable",
            Self::CreateView(_) => "CreateView",
            Self::DropView(_) => "DropView",
            Self::RenameView(_) => "RenameView",
            Self::CreateFunction(_) => "CreateFunction",
            Self::DropFunction(_) => "DropFunction",
            Self::RenameFunction(_) => "RenameFunction",
            Self::CreateProcedure(_) => "CreateProcedure",
            Self::DropProcedure(_) => "DropProcedure",
            Self::RenameProcedure(_) => "RenameProcedure",
            Self::CreateTrigger(_) => "CreateTrigger",
            Self::DropTrigger(_) => "DropTrigger",
            Self::RenameTrigger(_) => "RenameTrigger",
        }
    }

    /// Primary object name, used in error context.
    pub fn target(&self) -> &str {
        match self {
            Self::CreateTable(op) => &op.name,
            Self::AlterTable(op) => &op.name,
            Self::DeleteData(op) => &op.table,
            Self::DropTable(op) => &op.name,
            Self::DropSchema(op) => &op.name,
            Self::DropEnumType(op) => &op.name,
            Self::DropRowPolicy(op) => &op.name,
            Self::DropMaterializedView(op) => &op.name,
            Self::RenameTable(op) => &op.from,
            Self::CreateView(op) => &op.name,
            Self::DropView(op) => &op.name,
            Self::RenameView(op) => &op.from,
            Self::CreateFunction(op) => &op.name,
            Self::DropFunction(op) => &op.name,
            Self::RenameFunction(op) => &op.from,
            Self::CreateProcedure(op) => &op.name,
            Self::DropProcedure(op) => &op.name,
            Self::RenameProcedure(op) => &op.from,
            Self::CreateTrigger(op) => &op.name,
            Self::DropTrigger(op) => &op.name,
            Self::RenameTrigger(op) => &op.from,
        }
    }

    /// Required-field checks applied before dialect dispatch.
    pub fn validate(&self) -> Result<()> {
        self.require_non_empty(self.target(), "name")?;

        match self {
            Self::CreateTable(op) => {
                if op.fields.is_empty() {
                    return Err(Error::invalid_input(format!(
                        "CreateTable `{}` must define at least one field",
                        op.name
                    )));
                }
                for field in &op.fields {
                    self.require_non_empty(&field.name, "field name")?;
                }
            }
            Self::AlterTable(op) => {
                for field in &op.add_fields {
                    self.require_non_empty(&field.name, "field name")?;
                }
                for dropped in &op.drop_fields {
                    self.require_non_empty(&dropped.name, "drop field name")?;
                }
                for renamed in &op.rename_fields {
                    self.require_non_empty(&renamed.from, "rename from")?;
                    self.require_non_empty(&renamed.to, "rename to")?;
                }
            }
            Self::RenameTable(op) => self.require_non_empty(&op.to, "rename to")?,
            Self::RenameView(op) => self.require_non_empty(&op.to, "rename to")?,
            Self::RenameFunction(op) => self.require_non_empty(&op.to, "rename to")?,
            Self::RenameProcedure(op) => self.require_non_empty(&op.to, "rename to")?,
            Self::RenameTrigger(op) => {
                self.require_non_empty(&op.to, "rename to")?;
                self.require_non_empty(&op.table, "trigger table")?;
            }
            Self::CreateView(op) => self.require_non_empty(&op.definition, "view definition")?,
            Self::CreateFunction(op) => self.require_non_empty(&op.body, "function body")?,
            Self::CreateProcedure(op) => self.require_non_empty(&op.body, "procedure body")?,
            Self::CreateTrigger(op) => {
                self.require_non_empty(&op.table, "trigger table")?;
                self.require_non_empty(&op.body, "trigger body")?;
            }
            Self::DropRowPolicy(op) => self.require_non_empty(&op.table, "policy table")?,
            _ => {}
        }

        Ok(())
    }

    fn require_non_empty(&self, value: &str, what: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::invalid_input(format!(
                "{} requires a non-empty {what}",
                self.kind()
            )));
        }
        Ok(())
    }
}
