use crate::{
    Error, Field, Migration, Result, SchemaOp, ValidationConfig, ident::validate_identifier,
};

/// Portable type names the engine maps natively; anything else is a
/// dialect-specific pass-through, rejected only in strict mode.
const PORTABLE_TYPES: &[&str] = &[
    "bigint", "binary", "blob", "bool", "boolean", "char", "date", "datetime", "decimal",
    "double", "float", "int", "integer", "json", "numeric", "real", "smallint", "string", "text",
    "time", "timestamp", "uuid", "varchar",
];

/// Identifier and data-type checks applied before any DDL is emitted.
/// Disabled entirely when `validation.enabled` is false.
pub fn validate_migration(migration: &Migration, config: &ValidationConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.require_description && migration.description.trim().is_empty() {
        return Err(Error::invalid_input(format!(
            "migration `{}` requires a description",
            migration.name
        )));
    }

    for operation in [&migration.up, &migration.down] {
        for op in operation.ops_in_order() {
            check_identifier(op.target(), config)?;
            match op {
                SchemaOp::CreateTable(table) => {
                    for field in &table.fields {
                        check_field(field, config)?;
                    }
                }
                SchemaOp::AlterTable(alter) => {
                    for field in &alter.add_fields {
                        check_field(field, config)?;
                    }
                    for dropped in &alter.drop_fields {
                        check_identifier(&dropped.name, config)?;
                    }
                    for renamed in &alter.rename_fields {
                        check_identifier(&renamed.from, config)?;
                        check_identifier(&renamed.to, config)?;
                    }
                }
                SchemaOp::RenameTable(rename) => check_identifier(&rename.to, config)?,
                _ => {}
            }
        }
    }

    Ok(())
}

fn check_field(field: &Field, config: &ValidationConfig) -> Result<()> {
    check_identifier(&field.name, config)?;
    check_data_type(&field.name, &field.data_type, config)
}

fn check_identifier(ident: &str, config: &ValidationConfig) -> Result<()> {
    validate_identifier(ident, config.max_identifier_length)?;
    if config
        .forbidden_names
        .iter()
        .any(|forbidden| forbidden.eq_ignore_ascii_case(ident))
    {
        return Err(Error::invalid_input(format!(
            "identifier `{ident}` is forbidden by configuration"
        )));
    }
    Ok(())
}

fn check_data_type(field: &str, data_type: &str, config: &ValidationConfig) -> Result<()> {
    let lowered = data_type.to_ascii_lowercase();

    if !config.allowed_data_types.is_empty() {
        if config
            .allowed_data_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&lowered))
        {
            return Ok(());
        }
        return Err(Error::invalid_input(format!(
            "field `{field}` uses data type `{data_type}` outside the allowed list"
        )));
    }

    if config.strict_mode && !PORTABLE_TYPES.contains(&lowered.as_str()) {
        return Err(Error::invalid_input(format!(
            "field `{field}` uses non-portable data type `{data_type}` (strict mode)"
        )));
    }

    Ok(())
}
