use std::fmt::Write as _;

use stratum_core::{
    AlterTable, CreateTable, Dialect, Field, ForeignKey, Result, SchemaCache, SchemaOp,
    foreign_key_name, index_name, render_default, unique_index_name,
};

use crate::PostgresDialect;

pub(crate) fn emit(
    dialect: &PostgresDialect,
    op: &SchemaOp<'_>,
    _cache: &SchemaCache,
) -> Result<Vec<String>> {
    let statements = match op {
        SchemaOp::CreateTable(table) => emit_create_table(dialect, table),
        SchemaOp::AlterTable(alter) => emit_alter_table(dialect, alter),
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
        SchemaOp::DropSchema(drop) => {
            vec![format!(
                "DROP SCHEMA{} {}{};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name),
                cascade(drop.cascade)
            )]
        }
        SchemaOp::DropEnumType(drop) => {
            vec![format!(
                "DROP TYPE{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::DropRowPolicy(drop) => {
            vec![format!(
                "DROP POLICY{} {} ON {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name),
                dialect.quote_ident(&drop.table)
            )]
        }
        SchemaOp::DropMaterializedView(drop) => {
            vec![format!(
                "DROP MATERIALIZED VIEW{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::RenameTable(rename) => {
            vec![format!(
                "ALTER TABLE {} RENAME TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.to)
            )]
        }
        SchemaOp::CreateView(view) => {
            vec![format!(
                "CREATE {}VIEW {} AS {};",
                or_replace(view.or_replace),
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
        SchemaOp::RenameView(rename) => {
            vec![format!(
                "ALTER VIEW {} RENAME TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.to)
            )]
        }
        SchemaOp::CreateFunction(function) => {
            let returns = if function.returns.is_empty() {
                "void"
            } else {
                function.returns.as_str()
            };
            let language = if function.language.is_empty() {
                "plpgsql"
            } else {
                function.language.as_str()
            };
            vec![format!(
                "CREATE {}FUNCTION {}({}) RETURNS {returns} LANGUAGE {language} AS $$ {} $$;",
                or_replace(function.or_replace),
                dialect.quote_ident(&function.name),
                function.params,
                function.body.trim()
            )]
        }
        SchemaOp::DropFunction(drop) => {
            vec![format!(
                "DROP FUNCTION{} {}{};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name),
                cascade(drop.cascade)
            )]
        }
        SchemaOp::RenameFunction(rename) => {
            vec![format!(
                "ALTER FUNCTION {} RENAME TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.to)
            )]
        }
        SchemaOp::CreateProcedure(procedure) => {
            let language = if procedure.language.is_empty() {
                "plpgsql"
            } else {
                procedure.language.as_str()
            };
            vec![format!(
                "CREATE {}PROCEDURE {}({}) LANGUAGE {language} AS $$ {} $$;",
                or_replace(procedure.or_replace),
                dialect.quote_ident(&procedure.name),
                procedure.params,
                procedure.body.trim()
            )]
        }
        SchemaOp::DropProcedure(drop) => {
            vec![format!(
                "DROP PROCEDURE{} {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name)
            )]
        }
        SchemaOp::RenameProcedure(rename) => {
            vec![format!(
                "ALTER PROCEDURE {} RENAME TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.to)
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
            write!(sql, " {};", trigger.body.trim().trim_end_matches(';'))
                .expect("writing to String should not fail");
            vec![sql]
        }
        SchemaOp::DropTrigger(drop) => {
            vec![format!(
                "DROP TRIGGER{} {} ON {};",
                if_exists(drop.if_exists),
                dialect.quote_ident(&drop.name),
                dialect.quote_ident(&drop.table)
            )]
        }
        SchemaOp::RenameTrigger(rename) => {
            vec![format!(
                "ALTER TRIGGER {} ON {} RENAME TO {};",
                dialect.quote_ident(&rename.from),
                dialect.quote_ident(&rename.table),
                dialect.quote_ident(&rename.to)
            )]
        }
    };

    Ok(statements)
}

fn emit_create_table(dialect: &PostgresDialect, table: &CreateTable) -> Vec<String> {
    let mut elements: Vec<String> = table
        .fields
        .iter()
        .map(|field| render_field(dialect, field))
        .collect();

    let primary_key = table.primary_key_columns();
    if !primary_key.is_empty() {
        elements.push(format!(
            "PRIMARY KEY ({})",
            quoted_list(dialect, &primary_key)
        ));
    }

    for field in &table.fields {
        if let Some(foreign_key) = &field.foreign_key {
            elements.push(foreign_key_clause(dialect, &field.name, foreign_key));
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

fn emit_alter_table(dialect: &PostgresDialect, alter: &AlterTable) -> Vec<String> {
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
                foreign_key_clause_body(dialect, &field.name, foreign_key)
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
        statements.push(format!(
            "ALTER TABLE {table} RENAME COLUMN {} TO {};",
            dialect.quote_ident(&renamed.from),
            dialect.quote_ident(&renamed.to)
        ));
    }

    statements
}

fn render_field(dialect: &PostgresDialect, field: &Field) -> String {
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

pub(crate) fn index_statements(
    dialect: &PostgresDialect,
    table: &str,
    fields: &[Field],
) -> Vec<String> {
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

fn foreign_key_clause(dialect: &PostgresDialect, column: &str, fk: &ForeignKey) -> String {
    format!(
        "CONSTRAINT {} {}",
        foreign_key_name(column),
        foreign_key_clause_body(dialect, column, fk)
    )
}

fn foreign_key_clause_body(dialect: &PostgresDialect, column: &str, fk: &ForeignKey) -> String {
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

fn quoted_list(dialect: &PostgresDialect, names: &[String]) -> String {
    names
        .iter()
        .map(|name| dialect.quote_ident(name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn if_exists(flag: bool) -> &'static str {
    if flag { " IF EXISTS" } else { "" }
}

fn cascade(flag: bool) -> &'static str {
    if flag { " CASCADE" } else { "" }
}

fn or_replace(flag: bool) -> &'static str {
    if flag { "OR REPLACE " } else { "" }
}
