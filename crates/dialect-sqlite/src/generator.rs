use std::fmt::Write as _;

use stratum_core::{
    AlterTable, CreateTable, Dialect, Error, Field, ForeignKey, Result, SchemaCache, SchemaOp,
    index_name, render_default, unique_index_name,
};

use crate::SqliteDialect;

const BACKUP_SUFFIX: &str = "_backup";

pub(crate) fn emit(
    dialect: &SqliteDialect,
    op: &SchemaOp<'_>,
    cache: &SchemaCache,
) -> Result<Vec<String>> {
    let statements = match op {
        SchemaOp::CreateTable(table) => {
            let statements = emit_create_table(dialect, table);
            cache.record_create(table);
            statements
        }
        SchemaOp::AlterTable(alter) => emit_alter_table(dialect, alter, cache)?,
        SchemaOp::DeleteData(delete) => {
            let mut sql = format!("DELETE FROM {}", dialect.quote_ident(&delete.table));
            if let Some(clause) = &delete.where_clause {
                write!(sql, " WHERE {clause}").expect("writing to String should not fail");
            }
            sql.push(';');
            vec![sql]
        }
        SchemaOp::DropTable(drop) => {
            if drop.cascade {
                return Err(unsupported(dialect, op, "CASCADE on DROP TABLE"));
            }
            cache.record_drop(&drop.name);
            vec![format!(
                "DROP TABLE{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::RenameTable(rename) => {
            cache.record_rename(&rename.from, &rename.to);
            vec![format!(
                "ALTER TABLE {} RENAME TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.to)
            )]
        }
        SchemaOp::CreateView(view) => {
            if view.or_replace {
                return Err(unsupported(dialect, op, "CREATE OR REPLACE VIEW"));
            }
            vec![format!(
                "CREATE VIEW {} AS {};",
                dialect.quote_ident(&view.name),
                view.definition.trim_end_matches(';')
            )]
        }
        SchemaOp::DropView(drop) => {
            if drop.cascade {
                return Err(unsupported(dialect, op, "CASCADE on DROP VIEW"));
            }
            vec![format!(
                "DROP VIEW{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::CreateTrigger(trigger) => {
            let mut sql = format!(
                "CREATE TRIGGER {} {} {} ON {}",
                dialect.quote_ident(&trigger.name),
                trigger.timing.as_sql(),
                trigger.event.as_sql(),
                dialect.quote_ident(&trigger.table)
            );
            if trigger.for_each_row {
                sql.push_str(" FOR EACH ROW");
            }
            let body = trigger.body.trim().trim_end_matches(';');
            if body.to_ascii_lowercase().starts_with("begin") {
                write!(sql, " {body};").expect("writing to String should not fail");
            } else {
                write!(sql, " BEGIN {body}; END;").expect("writing to String should not fail");
            }
            vec![sql]
        }
        SchemaOp::DropTrigger(drop) => {
            vec![format!(
                "DROP TRIGGER{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::DropSchema(_) => return Err(unsupported(dialect, op, "schemas")),
        SchemaOp::DropEnumType(_) => return Err(unsupported(dialect, op, "enum types")),
        SchemaOp::DropRowPolicy(_) => return Err(unsupported(dialect, op, "row policies")),
        SchemaOp::DropMaterializedView(_) => {
            return Err(unsupported(dialect, op, "materialized views"));
        }
        SchemaOp::RenameView(_) => return Err(unsupported(dialect, op, "view renames")),
        SchemaOp::CreateFunction(_) | SchemaOp::DropFunction(_) | SchemaOp::RenameFunction(_) => {
            return Err(unsupported(dialect, op, "functions"));
        }
        SchemaOp::CreateProcedure(_)
        | SchemaOp::DropProcedure(_)
        | SchemaOp::RenameProcedure(_) => {
            return Err(unsupported(dialect, op, "procedures"));
        }
        SchemaOp::RenameTrigger(_) => return Err(unsupported(dialect, op, "trigger renames")),
    };

    Ok(statements)
}

fn emit_create_table(dialect: &SqliteDialect, table: &CreateTable) -> Vec<String> {
    let mut statements = vec![render_create_table(dialect, table)];
    statements.extend(index_statements(dialect, &table.name, &table.fields));
    statements
}

fn render_create_table(dialect: &SqliteDialect, table: &CreateTable) -> String {
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

    // Foreign keys can only be declared here; ALTER cannot add them.
    for field in &table.fields {
        if let Some(foreign_key) = &field.foreign_key {
            elements.push(foreign_key_clause(dialect, &field.name, foreign_key));
        }
    }

    format!(
        "CREATE TABLE {} ({});",
        dialect.quote_ident(&table.name),
        elements.join(", ")
    )
}

fn emit_alter_table(
    dialect: &SqliteDialect,
    alter: &AlterTable,
    cache: &SchemaCache,
) -> Result<Vec<String>> {
    for field in &alter.add_fields {
        if field.foreign_key.is_some() {
            return Err(Error::unsupported(
                dialect.name(),
                "AlterTable",
                &alter.name,
                "foreign keys must be defined at table creation",
            ));
        }
    }

    if !alter.requires_recreation() {
        let mut statements = Vec::new();
        for field in &alter.add_fields {
            statements.push(format!(
                "ALTER TABLE {} ADD COLUMN {};",
                dialect.quote_ident(&alter.name),
                render_field(dialect, field)
            ));
            statements.extend(index_statements(
                dialect,
                &alter.name,
                std::slice::from_ref(field),
            ));
        }
        if let Some(mut schema) = cache.get(&alter.name) {
            schema.fields.extend(alter.add_fields.iter().cloned());
            cache.replace(schema);
        }
        return Ok(statements);
    }

    recreate_table(dialect, alter, cache)
}

/// Drop and rename are not expressible through ALTER on SQLite: the
/// table is rebuilt from the schema observed at creation time, with
/// rows copied across under the rename mapping.
fn recreate_table(
    dialect: &SqliteDialect,
    alter: &AlterTable,
    cache: &SchemaCache,
) -> Result<Vec<String>> {
    let schema = cache.get(&alter.name).ok_or_else(|| {
        Error::invalid_input(format!(
            "no cached schema for table `{}`: sqlite drop/rename requires the table be created by this process",
            alter.name
        ))
    })?;

    for dropped in &alter.drop_fields {
        if !schema.fields.iter().any(|field| field.name == dropped.name) {
            return Err(Error::invalid_input(format!(
                "cannot drop unknown column `{}` from `{}`",
                dropped.name, alter.name
            )));
        }
    }
    for renamed in &alter.rename_fields {
        if !schema.fields.iter().any(|field| field.name == renamed.from) {
            return Err(Error::invalid_input(format!(
                "cannot rename unknown column `{}` on `{}`",
                renamed.from, alter.name
            )));
        }
    }

    let mut new_fields = Vec::new();
    let mut copy_targets = Vec::new();
    let mut copy_sources = Vec::new();

    for field in &schema.fields {
        if alter
            .drop_fields
            .iter()
            .any(|dropped| dropped.name == field.name)
        {
            continue;
        }
        let mut surviving = field.clone();
        if let Some(renamed) = alter
            .rename_fields
            .iter()
            .find(|renamed| renamed.from == field.name)
        {
            surviving.name = renamed.to.clone();
        }
        copy_targets.push(surviving.name.clone());
        copy_sources.push(field.name.clone());
        new_fields.push(surviving);
    }
    new_fields.extend(alter.add_fields.iter().cloned());

    let primary_key = schema
        .primary_key
        .iter()
        .filter(|name| {
            !alter
                .drop_fields
                .iter()
                .any(|dropped| dropped.name == **name)
        })
        .map(|name| {
            alter
                .rename_fields
                .iter()
                .find(|renamed| renamed.from == *name)
                .map(|renamed| renamed.to.clone())
                .unwrap_or_else(|| name.clone())
        })
        .collect();

    let new_schema = CreateTable {
        name: alter.name.clone(),
        fields: new_fields,
        primary_key,
    };

    let backup = format!("{}{BACKUP_SUFFIX}", alter.name);
    let mut statements = vec![
        "PRAGMA foreign_keys=off;".to_string(),
        format!(
            "ALTER TABLE {} RENAME TO {};",
            dialect.quote_ident(&alter.name),
            dialect.quote_ident(&backup)
        ),
        render_create_table(dialect, &new_schema),
        format!(
            "INSERT INTO {} ({}) SELECT {} FROM {};",
            dialect.quote_ident(&alter.name),
            copy_targets.join(", "),
            copy_sources.join(", "),
            dialect.quote_ident(&backup)
        ),
        format!("DROP TABLE {};", dialect.quote_ident(&backup)),
    ];
    // Index names survive the backup rename, so the new table's indexes
    // can only be created once the backup is gone.
    statements.extend(index_statements(dialect, &new_schema.name, &new_schema.fields));
    statements.push("PRAGMA foreign_keys=on;".to_string());

    cache.replace(new_schema);
    Ok(statements)
}

fn render_field(dialect: &SqliteDialect, field: &Field) -> String {
    let mut sql = format!(
        "{} {}",
        dialect.quote_ident(&field.name),
        dialect.map_type(&field.data_type, field.size, field.scale, field.auto_increment)
    );

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

fn index_statements(dialect: &SqliteDialect, table: &str, fields: &[Field]) -> Vec<String> {
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

fn foreign_key_clause(dialect: &SqliteDialect, column: &str, fk: &ForeignKey) -> String {
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

fn unsupported(dialect: &SqliteDialect, op: &SchemaOp<'_>, detail: &str) -> Error {
    Error::unsupported(
        dialect.name(),
        op.kind(),
        op.target(),
        format!("sqlite does not support {detail}"),
    )
}

fn if_exists(flag: bool) -> &'static str {
    if flag { " IF EXISTS" } else { "" }
}
