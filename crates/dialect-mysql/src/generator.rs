use std::fmt::Write as _;

use stratum_core::{
    AlterTable, CreateTable, Dialect, Error, Field, ForeignKey, Result, SchemaCache, SchemaOp,
    foreign_key_name, index_name, render_default, unique_index_name,
};

use crate::MysqlDialect;

pub(crate) fn emit(
    dialect: &MysqlDialect,
    op: &SchemaOp<'_>,
    _cache: &SchemaCache,
) -> Result<Vec<String>> {
    let statements = match op {
        SchemaOp::CreateTable(table) => emit_create_table(dialect, table),
        SchemaOp::AlterTable(alter) => emit_alter_table(dialect, alter)?,
        SchemaOp::DeleteData(delete) => {
            let mut sql = format!("DELETE FROM {}", dialect.quote_ident(&delete.table));
            if let Some(clause) = &delete.where_clause {
                write!(sql, " WHERE {clause}").expect("writing to String should not fail");
            }
            sql.push(';');
            vec![sql]
        }
        SchemaOp::DropTable(drop) => {
            vec![format!(
                "DROP TABLE{} {}{};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name),
                cascade(drop.cascade)
            )]
        }
        SchemaOp::RenameTable(rename) => {
            vec![format!(
                "RENAME TABLE {} TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.to)
            )]
        }
        SchemaOp::CreateView(view) => {
            vec![format!(
                "CREATE {}VIEW {} AS {};",
                if view.or_replace { "OR REPLACE " } else { "" },
                dialect.quote_ident(&view.name),
                view.definition.trim_end_matches(';')
            )]
        }
        SchemaOp::DropView(drop) => {
            vec![format!(
                "DROP VIEW{} {}{};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name),
                cascade(drop.cascade)
            )]
        }
        // MySQL renames views through RENAME TABLE.
        SchemaOp::RenameView(rename) => {
            vec![format!(
                "RENAME TABLE {} TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.to)
            )]
        }
        SchemaOp::CreateFunction(function) => {
            let returns = if function.returns.is_empty() {
                "INT"
            } else {
                function.returns.as_str()
            };
            let mut statements = Vec::new();
            if function.or_replace {
                statements.push(format!(
                    "DROP FUNCTION IF EXISTS {};",
                    dialect.quote_ident(&function.name)
                ));
            }
            statements.push(format!(
                "CREATE FUNCTION {}({}) RETURNS {returns} DETERMINISTIC {};",
                dialect.quote_ident(&function.name),
                function.params,
                function.body.trim().trim_end_matches(';')
            ));
            statements
        }
        SchemaOp::DropFunction(drop) => {
            if drop.cascade {
                return Err(unsupported(dialect, op, "CASCADE on DROP FUNCTION"));
            }
            vec![format!(
                "DROP FUNCTION{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::CreateProcedure(procedure) => {
            let mut statements = Vec::new();
            if procedure.or_replace {
                statements.push(format!(
                    "DROP PROCEDURE IF EXISTS {};",
                    dialect.quote_ident(&procedure.name)
                ));
            }
            statements.push(format!(
                "CREATE PROCEDURE {}({}) {};",
                dialect.quote_ident(&procedure.name),
                procedure.params,
                procedure.body.trim().trim_end_matches(';')
            ));
            statements
        }
        SchemaOp::DropProcedure(drop) => {
            vec![format!(
                "DROP PROCEDURE{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::CreateTrigger(trigger) => {
            vec![format!(
                "CREATE TRIGGER {} {} {} ON {} FOR EACH ROW {};",
                dialect.quote_ident(&trigger.name),
                trigger.timing.as_sql(),
                trigger.event.as_sql(),
                dialect.quote_ident(&trigger.table),
                trigger.body.trim().trim_end_matches(';')
            )]
        }
        SchemaOp::DropTrigger(drop) => {
            vec![format!(
                "DROP TRIGGER{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::DropSchema(_) => return Err(unsupported(dialect, op, "schema drops")),
        SchemaOp::DropEnumType(_) => return Err(unsupported(dialect, op, "enum types")),
        SchemaOp::DropRowPolicy(_) => return Err(unsupported(dialect, op, "row policies")),
        SchemaOp::DropMaterializedView(_) => {
            return Err(unsupported(dialect, op, "materialized views"));
        }
        SchemaOp::RenameFunction(_) => return Err(unsupported(dialect, op, "function renames")),
        SchemaOp::RenameProcedure(_) => {
            return Err(unsupported(dialect, op, "procedure renames"));
        }
        SchemaOp::RenameTrigger(_) => return Err(unsupported(dialect, op, "trigger renames")),
    };

    Ok(statements)
}

fn emit_create_table(dialect: &MysqlDialect, table: &CreateTable) -> Vec<String> {
    let mut elements: Vec<String> = table
        .fields
        .iter()
        .map(|field| render_field(dialect, field))
        .collect();

    let primary_key = table.primary_key_columns();
    if !primary_key.is_empty() {
        elements.push(format!(
            "PRIMARY KEY ({})",
            primary_key
                .iter()
                .map(|name| dialect.quote_ident(name))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    for field in &table.fields {
        if let Some(foreign_key) = &field.foreign_key {
            elements.push(format!(
                "CONSTRAINT {} {}",
                foreign_key_name(&field.name),
                foreign_key_clause(dialect, &field.name, foreign_key)
            ));
        }
    }

    let mut statements = vec![format!(
        "CREATE TABLE {} ({});",
        dialect.quote_ident(&table.name),
        elements.join(", ")
    )];
    statements.extend(index_statements(dialect, &table.name, &table.fields));
    statements
}

fn emit_alter_table(dialect: &MysqlDialect, alter: &AlterTable) -> Result<Vec<String>> {
    let mut statements = Vec::new();
    let table = dialect.quote_ident(&alter.name);

    for field in &alter.add_fields {
        statements.push(format!(
            "ALTER TABLE {table} ADD COLUMN {};",
            render_field(dialect, field)
        ));
        statements.extend(index_statements(
            dialect,
            &alter.name,
            std::slice::from_ref(field),
        ));
        if let Some(foreign_key) = &field.foreign_key {
            statements.push(format!(
                "ALTER TABLE {table} ADD CONSTRAINT {} {};",
                foreign_key_name(&field.name),
                foreign_key_clause(dialect, &field.name, foreign_key)
            ));
        }
    }

    for dropped in &alter.drop_fields {
        statements.push(format!(
            "ALTER TABLE {table} DROP COLUMN {};",
            dialect.quote_ident(&dropped.name)
        ));
    }

    for renamed in &alter.rename_fields {
        let Some(data_type) = &renamed.data_type else {
            return Err(Error::invalid_input(format!(
                "MySQL rename of column `{}` on `{}` requires a type for CHANGE",
                renamed.from, alter.name
            )));
        };
        statements.push(format!(
            "ALTER TABLE {table} CHANGE {} {} {};",
            dialect.quote_ident(&renamed.from),
            dialect.quote_ident(&renamed.to),
            dialect.map_type(data_type, 0, 0, false)
        ));
    }

    Ok(statements)
}

fn render_field(dialect: &MysqlDialect, field: &Field) -> String {
    let mut sql = format!(
        "{} {}",
        dialect.quote_ident(&field.name),
        dialect.map_type(&field.data_type, field.size, field.scale, field.auto_increment)
    );

    if field.auto_increment {
        sql.push_str(" AUTO_INCREMENT");
    }
    if !field.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = render_default(field) {
        write!(sql, " DEFAULT {default}").expect("writing to String should not fail");
    }
    if let Some(check) = &field.check {
        write!(sql, " CHECK ({check})").expect("writing to String should not fail");
    }

    sql
}

fn index_statements(dialect: &MysqlDialect, table: &str, fields: &[Field]) -> Vec<String> {
    let mut statements = Vec::new();
    for field in fields {
        if field.unique {
            statements.push(format!(
                "CREATE UNIQUE INDEX {} ON {} ({});",
                unique_index_name(table, &field.name),
                dialect.quote_ident(table),
                dialect.quote_ident(&field.name)
            ));
        }
        if field.index {
            statements.push(format!(
                "CREATE INDEX {} ON {} ({});",
                index_name(table, &field.name),
                dialect.quote_ident(table),
                dialect.quote_ident(&field.name)
            ));
        }
    }
    statements
}

fn foreign_key_clause(dialect: &MysqlDialect, column: &str, fk: &ForeignKey) -> String {
    let mut sql = format!(
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        dialect.quote_ident(column),
        dialect.quote_ident(&fk.reference_table),
        dialect.quote_ident(&fk.reference_field)
    );
    if let Some(on_delete) = &fk.on_delete {
        write!(sql, " ON DELETE {}", on_delete.to_uppercase())
            .expect("writing to String should not fail");
    }
    if let Some(on_update) = &fk.on_update {
        write!(sql, " ON UPDATE {}", on_update.to_uppercase())
            .expect("writing to String should not fail");
    }
    sql
}

fn unsupported(dialect: &MysqlDialect, op: &SchemaOp<'_>, detail: &str) -> Error {
    Error::unsupported(
        dialect.name(),
        op.kind(),
        op.target(),
        format!("MySQL does not support {detail}"),
    )
}

fn if_exists(flag: bool) -> &'static str {
    if flag { " IF EXISTS" } else { "" }
}

fn cascade(flag: bool) -> &'static str {
    if flag { " CASCADE" } else { "" }
}
