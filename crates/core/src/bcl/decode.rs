use super::parser::{BclBlock, BclValue, normalize_key, parse_document};
use crate::{
    AlterTable, CreateFunction, CreateProcedure, CreateTable, CreateTrigger, CreateView,
    DeleteData, DropEnumType, DropField, DropFunction, DropMaterializedView, DropProcedure,
    DropRowPolicy, DropSchema, DropTable, DropTrigger, DropView, Error, Field, ForeignKey,
    Migration, Operation, RenameField, RenameFunction, RenameProcedure, RenameTable,
    RenameTrigger, RenameView, Result, SqlValue, TransactionConfig, TriggerEvent, TriggerTiming,
    ValidationHooks,
    seed::{Seed, SeedCondition, SeedField},
};

/// Parses a `.bcl` migration file body into the schema model.
pub fn parse_migration_source(source: &str, file: &str) -> Result<Migration> {
    let document = parse_document(source, file)?;
    let block = document
        .blocks
        .iter()
        .find(|block| normalize_key(&block.keyword) == "migration")
        .ok_or_else(|| Error::parse(file, 1, 1, "no `Migration` block found"))?;
    decode_migration(block, file)
}

/// Parses a `.bcl` seed file body into the seed model.
pub fn parse_seed_source(source: &str, file: &str) -> Result<Seed> {
    let document = parse_document(source, file)?;
    let block = document
        .blocks
        .iter()
        .find(|block| normalize_key(&block.keyword) == "seed")
        .ok_or_else(|| Error::parse(file, 1, 1, "no `Seed` block found"))?;
    decode_seed(block, file)
}

pub fn decode_migration(block: &BclBlock, file: &str) -> Result<Migration> {
    let name = block
        .label
        .clone()
        .filter(|label| !label.trim().is_empty())
        .ok_or_else(|| Error::parse(file, block.line, 1, "Migration requires a name label"))?;

    let mut migration = Migration::named(name);
    migration.version = attr_string(block, "version").unwrap_or_default();
    migration.description = attr_string(block, "description").unwrap_or_default();
    migration.connection = attr_string(block, "connection");
    migration.driver = attr_string(block, "driver");
    migration.disable = attr_bool(block, "disable", false);

    for transaction in block.blocks_named("transaction") {
        migration.transaction.push(TransactionConfig {
            isolation_level: attr_string(transaction, "isolation_level"),
        });
    }

    for validate in block.blocks_named("validate") {
        migration.validate.push(ValidationHooks {
            pre_up_checks: attr_strings(validate, "pre_up_checks"),
            post_up_checks: attr_strings(validate, "post_up_checks"),
        });
    }

    if let Some(up) = block.blocks_named("up").next() {
        migration.up = decode_operation(up, file)?;
    }
    if let Some(down) = block.blocks_named("down").next() {
        migration.down = decode_operation(down, file)?;
    }

    Ok(migration)
}

fn decode_operation(block: &BclBlock, file: &str) -> Result<Operation> {
    let mut operation = Operation::default();

    for child in &block.blocks {
        match normalize_key(&child.keyword).as_str() {
            "createtable" => operation.create_tables.push(decode_create_table(child, file)?),
            "altertable" => operation.alter_tables.push(decode_alter_table(child, file)?),
            "deletedata" => operation.delete_data.push(DeleteData {
                table: require_label(child, file)?,
                where_clause: attr_string(child, "where"),
            }),
            "droptable" => operation.drop_tables.push(DropTable {
                name: require_label(child, file)?,
                if_exists: attr_bool(child, "if_exists", false),
                cascade: attr_bool(child, "cascade", false),
            }),
            "dropschema" => operation.drop_schemas.push(DropSchema {
                name: require_label(child, file)?,
                if_exists: attr_bool(child, "if_exists", false),
                cascade: attr_bool(child, "cascade", false),
            }),
            "dropenumtype" => operation.drop_enum_types.push(DropEnumType {
                name: require_label(child, file)?,
                if_exists: attr_bool(child, "if_exists", false),
            }),
            "droprowpolicy" => operation.drop_row_policies.push(DropRowPolicy {
                name: require_label(child, file)?,
                table: attr_string(child, "table").unwrap_or_default(),
                if_exists: attr_bool(child, "if_exists", false),
            }),
            "dropmaterializedview" => {
                operation.drop_materialized_views.push(DropMaterializedView {
                    name: require_label(child, file)?,
                    if_exists: attr_bool(child, "if_exists", false),
                })
            }
            "renametable" => operation.rename_tables.push(RenameTable {
                from: rename_from(child, file)?,
                to: attr_string(child, "to").unwrap_or_default(),
            }),
            "createview" => operation.create_views.push(CreateView {
                name: require_label(child, file)?,
                definition: attr_string(child, "definition").unwrap_or_default(),
                or_replace: attr_bool(child, "or_replace", false),
            }),
            "dropview" => operation.drop_views.push(DropView {
                name: require_label(child, file)?,
                if_exists: attr_bool(child, "if_exists", false),
                cascade: attr_bool(child, "cascade", false),
            }),
            "renameview" => operation.rename_views.push(RenameView {
                from: rename_from(child, file)?,
                to: attr_string(child, "to").unwrap_or_default(),
            }),
            "createfunction" => operation.create_functions.push(CreateFunction {
                name: require_label(child, file)?,
                params: attr_string(child, "params").unwrap_or_default(),
                returns: attr_string(child, "returns").unwrap_or_default(),
                language: attr_string(child, "language").unwrap_or_default(),
                body: attr_string(child, "body").unwrap_or_default(),
                or_replace: attr_bool(child, "or_replace", false),
            }),
            "dropfunction" => operation.drop_functions.push(DropFunction {
                name: require_label(child, file)?,
                if_exists: attr_bool(child, "if_exists", false),
                cascade: attr_bool(child, "cascade", false),
            }),
            "renamefunction" => operation.rename_functions.push(RenameFunction {
                from: rename_from(child, file)?,
                to: attr_string(child, "to").unwrap_or_default(),
            }),
            "createprocedure" => operation.create_procedures.push(CreateProcedure {
                name: require_label(child, file)?,
                params: attr_string(child, "params").unwrap_or_default(),
                language: attr_string(child, "language").unwrap_or_default(),
                body: attr_string(child, "body").unwrap_or_default(),
                or_replace: attr_bool(child, "or_replace", false),
            }),
            "dropprocedure" => operation.drop_procedures.push(DropProcedure {
                name: require_label(child, file)?,
                if_exists: attr_bool(child, "if_exists", false),
            }),
            "renameprocedure" => operation.rename_procedures.push(RenameProcedure {
                from: rename_from(child, file)?,
                to: attr_string(child, "to").unwrap_or_default(),
            }),
            "createtrigger" => operation.create_triggers.push(decode_create_trigger(child, file)?),
            "droptrigger" => operation.drop_triggers.push(DropTrigger {
                name: require_label(child, file)?,
                table: attr_string(child, "table").unwrap_or_default(),
                if_exists: attr_bool(child, "if_exists", false),
            }),
            "renametrigger" => operation.rename_triggers.push(RenameTrigger {
                table: attr_string(child, "table").unwrap_or_default(),
                from: rename_from(child, file)?,
                to: attr_string(child, "to").unwrap_or_default(),
            }),
            other => {
                return Err(Error::parse(
                    file,
                    child.line,
                    1,
                    format!("unknown operation block `{other}`"),
                ));
            }
        }
    }

    Ok(operation)
}

fn decode_create_table(block: &BclBlock, file: &str) -> Result<CreateTable> {
    let mut table = CreateTable::named(require_label(block, file)?);
    table.primary_key = attr_strings(block, "primary_key");
    for field in block.blocks_named("field") {
        table.fields.push(decode_field(field, file)?);
    }
    Ok(table)
}

fn decode_alter_table(block: &BclBlock, file: &str) -> Result<AlterTable> {
    let mut alter = AlterTable {
        name: require_label(block, file)?,
        ..AlterTable::default()
    };
    for child in &block.blocks {
        match normalize_key(&child.keyword).as_str() {
            "addfield" | "field" => alter.add_fields.push(decode_field(child, file)?),
            "dropfield" => alter.drop_fields.push(DropField {
                name: require_label(child, file)?,
            }),
            "renamefield" => alter.rename_fields.push(RenameField {
                from: rename_from(child, file)?,
                to: attr_string(child, "to").unwrap_or_default(),
                data_type: attr_string(child, "type"),
            }),
            other => {
                return Err(Error::parse(
                    file,
                    child.line,
                    1,
                    format!("unknown AlterTable block `{other}`"),
                ));
            }
        }
    }
    Ok(alter)
}

fn decode_field(block: &BclBlock, file: &str) -> Result<Field> {
    let name = require_label(block, file)?;
    let data_type = attr_string(block, "type").ok_or_else(|| {
        Error::parse(
            file,
            block.line,
            1,
            format!("field `{name}` requires a type"),
        )
    })?;

    let mut field = Field::new(name, data_type);
    field.size = attr_u32(block, "size");
    field.scale = attr_u32(block, "scale");
    field.nullable = attr_bool(block, "nullable", false);
    field.default = block.attr("default").map(BclValue::render);
    field.check = attr_string(block, "check");
    field.auto_increment = attr_bool(block, "auto_increment", false);
    field.primary_key = attr_bool(block, "primary_key", false);
    field.unique = attr_bool(block, "unique", false);
    field.index = attr_bool(block, "index", false);

    if let Some(foreign_key) = block.blocks_named("foreign_key").next() {
        field.foreign_key = Some(ForeignKey {
            reference_table: attr_string(foreign_key, "reference_table").unwrap_or_default(),
            reference_field: attr_string(foreign_key, "reference_field").unwrap_or_default(),
            on_delete: attr_string(foreign_key, "on_delete"),
            on_update: attr_string(foreign_key, "on_update"),
        });
    }

    Ok(field)
}

fn decode_create_trigger(block: &BclBlock, file: &str) -> Result<CreateTrigger> {
    let name = require_label(block, file)?;
    let timing_raw = attr_string(block, "timing").unwrap_or_else(|| "before".to_string());
    let timing = TriggerTiming::parse(&timing_raw).ok_or_else(|| {
        Error::parse(
            file,
            block.line,
            1,
            format!("unknown trigger timing `{timing_raw}`"),
        )
    })?;
    let event_raw = attr_string(block, "event").unwrap_or_else(|| "insert".to_string());
    let event = TriggerEvent::parse(&event_raw).ok_or_else(|| {
        Error::parse(
            file,
            block.line,
            1,
            format!("unknown trigger event `{event_raw}`"),
        )
    })?;

    Ok(CreateTrigger {
        name,
        table: attr_string(block, "table").unwrap_or_default(),
        timing,
        event,
        for_each_row: attr_bool(block, "for_each_row", true),
        body: attr_string(block, "body").unwrap_or_default(),
    })
}

pub fn decode_seed(block: &BclBlock, file: &str) -> Result<Seed> {
    let name = block
        .label
        .clone()
        .filter(|label| !label.trim().is_empty())
        .ok_or_else(|| Error::parse(file, block.line, 1, "Seed requires a name label"))?;
    let table = attr_string(block, "table").ok_or_else(|| {
        Error::parse(file, block.line, 1, format!("seed `{name}` requires a table"))
    })?;

    let condition = match attr_string(block, "condition").as_deref() {
        None => None,
        Some("if_exists") => Some(SeedCondition::IfExists),
        Some("if_not_exists") => Some(SeedCondition::IfNotExists),
        Some(other) => {
            return Err(Error::parse(
                file,
                block.line,
                1,
                format!("unknown seed condition `{other}`"),
            ));
        }
    };

    let mut seed = Seed {
        name,
        table,
        fields: Vec::new(),
        combine: attr_strings(block, "combine"),
        condition,
        rows: attr_u32(block, "rows") as usize,
    };

    for field in block.blocks_named("field") {
        seed.fields.push(decode_seed_field(field, file)?);
    }

    Ok(seed)
}

fn decode_seed_field(block: &BclBlock, file: &str) -> Result<SeedField> {
    let name = require_label(block, file)?;
    let value = match block.attr("value") {
        Some(BclValue::Str(value)) => SqlValue::Text(value.clone()),
        Some(BclValue::Int(value)) => SqlValue::Integer(*value),
        Some(BclValue::Float(value)) => SqlValue::Float(*value),
        Some(BclValue::Bool(value)) => SqlValue::Bool(*value),
        Some(BclValue::Array(_)) => {
            return Err(Error::parse(
                file,
                block.line,
                1,
                format!("seed field `{name}` value must be a scalar"),
            ));
        }
        None => SqlValue::Null,
    };

    Ok(SeedField {
        name,
        value,
        unique: attr_bool(block, "unique", false),
        random: attr_bool(block, "random", false),
        size: attr_u32(block, "size"),
        data_type: attr_string(block, "data_type"),
    })
}

fn require_label(block: &BclBlock, file: &str) -> Result<String> {
    block
        .label
        .clone()
        .filter(|label| !label.trim().is_empty())
        .ok_or_else(|| {
            Error::parse(
                file,
                block.line,
                1,
                format!("`{}` requires a name label", block.keyword),
            )
        })
}

/// Rename blocks accept the source name either as the block label
/// (`RenameTable "old" { to = "new" }`) or as a `from` attribute.
fn rename_from(block: &BclBlock, _file: &str) -> Result<String> {
    if let Some(from) = attr_string(block, "from") {
        return Ok(from);
    }
    Ok(block.label.clone().unwrap_or_default())
}

fn attr_string(block: &BclBlock, key: &str) -> Option<String> {
    block
        .attr(key)
        .map(BclValue::render)
        .filter(|value| !value.is_empty())
}

fn attr_strings(block: &BclBlock, key: &str) -> Vec<String> {
    match block.attr(key) {
        Some(BclValue::Array(values)) => values.iter().map(BclValue::render).collect(),
        Some(value) => vec![value.render()],
        None => Vec::new(),
    }
}

fn attr_bool(block: &BclBlock, key: &str, default: bool) -> bool {
    block
        .attr(key)
        .and_then(BclValue::as_bool)
        .unwrap_or(default)
}

fn attr_u32(block: &BclBlock, key: &str) -> u32 {
    block
        .attr(key)
        .and_then(BclValue::as_int)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(0)
}
