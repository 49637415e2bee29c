mod support;

use stratum_core::{
    AlterTable, CreateTable, CreateTrigger, CreateView, DeleteData, Direction, DropTable,
    DropView, Error, Field, Migration, Operation, RenameField, RenameTable, SchemaCache,
};
use support::fake_dialect::FakeDialect;

fn table(name: &str) -> CreateTable {
    CreateTable {
        name: name.to_string(),
        fields: vec![Field::new("id", "integer")],
        primary_key: Vec::new(),
    }
}

#[test]
fn categories_emit_in_fixed_order_regardless_of_source_layout() {
    let mut operation = Operation::default();
    operation.create_triggers.push(CreateTrigger {
        name: "tg".to_string(),
        table: "t".to_string(),
        body: "EXECUTE FUNCTION f()".to_string(),
        ..CreateTrigger::default()
    });
    operation.drop_tables.push(DropTable {
        name: "old".to_string(),
        ..DropTable::default()
    });
    operation.create_views.push(CreateView {
        name: "v".to_string(),
        definition: "SELECT 1".to_string(),
        or_replace: false,
    });
    operation.delete_data.push(DeleteData {
        table: "t".to_string(),
        where_clause: None,
    });
    operation.rename_tables.push(RenameTable {
        from: "a".to_string(),
        to: "b".to_string(),
    });
    operation.alter_tables.push(AlterTable {
        name: "t".to_string(),
        add_fields: vec![Field::new("c", "string")],
        ..AlterTable::default()
    });
    operation.create_tables.push(table("t"));

    let statements = operation
        .to_sql(&FakeDialect, &SchemaCache::default())
        .expect("fan-out should succeed");

    let kinds: Vec<&str> = statements
        .iter()
        .map(|statement| statement.split_whitespace().nth(1).unwrap_or_default())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "CreateTable",
            "AlterTable",
            "DeleteData",
            "DropTable",
            "RenameTable",
            "CreateView",
            "CreateTrigger",
        ]
    );
}

#[test]
fn items_within_a_category_keep_source_order() {
    let mut operation = Operation::default();
    operation.create_tables.push(table("first"));
    operation.create_tables.push(table("second"));
    operation.create_tables.push(table("third"));

    let statements = operation
        .to_sql(&FakeDialect, &SchemaCache::default())
        .expect("fan-out should succeed");
    assert_eq!(
        statements,
        vec![
            "-- CreateTable first",
            "-- CreateTable second",
            "-- CreateTable third",
        ]
    );
}

#[test]
fn create_table_without_fields_is_invalid_input() {
    let mut operation = Operation::default();
    operation.create_tables.push(CreateTable::named("empty"));

    let error = operation
        .to_sql(&FakeDialect, &SchemaCache::default())
        .expect_err("zero fields must be rejected");
    assert!(matches!(error, Error::InvalidInput(_)), "got {error:?}");
}

#[test]
fn empty_names_are_invalid_input() {
    let mut operation = Operation::default();
    operation.drop_views.push(DropView::default());

    let error = operation
        .to_sql(&FakeDialect, &SchemaCache::default())
        .expect_err("empty name must be rejected");
    assert!(matches!(error, Error::InvalidInput(_)));
}

#[test]
fn rename_without_target_is_invalid_input() {
    let mut operation = Operation::default();
    operation.rename_tables.push(RenameTable {
        from: "a".to_string(),
        to: String::new(),
    });

    assert!(
        operation
            .to_sql(&FakeDialect, &SchemaCache::default())
            .is_err()
    );
}

#[test]
fn rename_field_requires_both_ends() {
    let mut operation = Operation::default();
    operation.alter_tables.push(AlterTable {
        name: "t".to_string(),
        rename_fields: vec![RenameField {
            from: "a".to_string(),
            to: String::new(),
            data_type: None,
        }],
        ..AlterTable::default()
    });

    assert!(
        operation
            .to_sql(&FakeDialect, &SchemaCache::default())
            .is_err()
    );
}

#[test]
fn migration_with_empty_name_is_rejected() {
    let migration = Migration::default();
    let error = migration
        .to_sql(&FakeDialect, Direction::Up, &SchemaCache::default())
        .expect_err("empty migration name must be rejected");
    assert!(matches!(error, Error::InvalidInput(_)));
}

#[test]
fn explicit_primary_key_supersedes_field_flags() {
    let table = CreateTable {
        name: "t".to_string(),
        fields: vec![
            Field {
                primary_key: true,
                ..Field::new("a", "integer")
            },
            Field::new("b", "integer"),
        ],
        primary_key: vec!["b".to_string()],
    };
    assert_eq!(table.primary_key_columns(), vec!["b".to_string()]);
}

#[test]
fn flagged_fields_contribute_to_the_key_in_source_order() {
    let table = CreateTable {
        name: "t".to_string(),
        fields: vec![
            Field {
                primary_key: true,
                ..Field::new("tenant", "integer")
            },
            Field::new("note", "string"),
            Field {
                primary_key: true,
                ..Field::new("id", "integer")
            },
        ],
        primary_key: Vec::new(),
    };
    assert_eq!(
        table.primary_key_columns(),
        vec!["tenant".to_string(), "id".to_string()]
    );
}
