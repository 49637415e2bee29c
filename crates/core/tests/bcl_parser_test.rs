use stratum_core::{
    Error, SqlValue,
    bcl::{parse_document, parse_migration_source, parse_seed_source},
};

const USERS_MIGRATION: &str = r#"
# creates the users table
Migration "users" {
  Version = "1.0.0"
  Description = "create users"

  Transaction { IsolationLevel = "serializable" }
  Validate {
    PreUpChecks = ["schema_ready"]
    PostUpChecks = ["row_count_ok"]
  }

  Up {
    CreateTable "users" {
      Field "id" { type = integer, primary_key = true, auto_increment = true }
      Field "email" { type = string, size = 255, unique = true }
      Field "bio" { type = text, nullable = true, default = null }
      Field "created_at" { type = timestamp, default = now() }
    }
  }

  Down {
    DropTable "users" { if_exists = true }
  }
}
"#;

#[test]
fn parses_a_full_migration() {
    let migration =
        parse_migration_source(USERS_MIGRATION, "users.bcl").expect("migration should parse");

    assert_eq!(migration.name, "users");
    assert_eq!(migration.version, "1.0.0");
    assert_eq!(migration.description, "create users");
    assert!(!migration.disable);
    assert_eq!(
        migration.transaction[0].isolation_level.as_deref(),
        Some("serializable")
    );
    assert_eq!(migration.validate[0].pre_up_checks, vec!["schema_ready"]);
    assert_eq!(migration.validate[0].post_up_checks, vec!["row_count_ok"]);

    let table = &migration.up.create_tables[0];
    assert_eq!(table.name, "users");
    assert_eq!(table.fields.len(), 4);

    let id = &table.fields[0];
    assert_eq!(id.data_type, "integer");
    assert!(id.primary_key && id.auto_increment);
    assert!(!id.nullable);

    let email = &table.fields[1];
    assert_eq!(email.size, 255);
    assert!(email.unique);

    let bio = &table.fields[2];
    assert!(bio.nullable);
    assert_eq!(bio.default.as_deref(), Some("null"));

    let created = &table.fields[3];
    assert_eq!(created.default.as_deref(), Some("now()"));

    assert_eq!(migration.down.drop_tables[0].name, "users");
    assert!(migration.down.drop_tables[0].if_exists);
}

#[test]
fn parses_alter_rename_and_foreign_key_blocks() {
    let source = r#"
Migration "orders" {
  Up {
    AlterTable "orders" {
      AddField "user_id" {
        type = integer
        ForeignKey {
          reference_table = "users"
          reference_field = "id"
          on_delete = "cascade"
        }
      }
      DropField "legacy" {}
      RenameField { from = "total", to = "amount", type = "decimal" }
    }
    RenameTable { from = "orders", to = "purchases" }
  }
  Down {}
}
"#;
    let migration = parse_migration_source(source, "orders.bcl").expect("should parse");
    let alter = &migration.up.alter_tables[0];

    let added = &alter.add_fields[0];
    let fk = added.foreign_key.as_ref().expect("foreign key parsed");
    assert_eq!(fk.reference_table, "users");
    assert_eq!(fk.reference_field, "id");
    assert_eq!(fk.on_delete.as_deref(), Some("cascade"));

    assert_eq!(alter.drop_fields[0].name, "legacy");
    assert_eq!(alter.rename_fields[0].from, "total");
    assert_eq!(alter.rename_fields[0].to, "amount");
    assert_eq!(alter.rename_fields[0].data_type.as_deref(), Some("decimal"));

    assert_eq!(migration.up.rename_tables[0].to, "purchases");
}

#[test]
fn field_without_type_is_a_parse_error() {
    let source = r#"
Migration "bad" {
  Up { CreateTable "t" { Field "x" { size = 10 } } }
  Down {}
}
"#;
    let error = parse_migration_source(source, "bad.bcl").expect_err("missing type must fail");
    assert!(matches!(error, Error::Parse { .. }), "got {error:?}");
}

#[test]
fn unknown_operation_block_is_a_parse_error() {
    let source = r#"
Migration "bad" {
  Up { ExplodeTable "t" {} }
  Down {}
}
"#;
    let error = parse_migration_source(source, "bad.bcl").expect_err("unknown block must fail");
    let rendered = error.to_string();
    assert!(rendered.contains("explodetable"), "got: {rendered}");
}

#[test]
fn unterminated_block_reports_position() {
    let error =
        parse_migration_source("Migration \"x\" { Up {", "x.bcl").expect_err("must fail");
    assert!(matches!(error, Error::Parse { .. }));
}

#[test]
fn migration_without_label_is_rejected() {
    let error = parse_migration_source("Migration { Up {} Down {} }", "x.bcl")
        .expect_err("label required");
    assert!(matches!(error, Error::Parse { .. }));
}

#[test]
fn parses_seed_files() {
    let source = r#"
Seed "users" {
  table = "users"
  condition = "if_exists"
  combine = ["first", "last"]
  rows = 25

  Field "id" { value = "fake_uuid", unique = true }
  Field "first" { value = "fake_first_name" }
  Field "last" { value = "fake_last_name" }
  Field "age" { value = "fake_age", data_type = "int" }
  Field "adult" { value = "expr: age.value >= 18 ? true : false", data_type = "boolean" }
  Field "plan" { value = "basic" }
  Field "credits" { value = 100 }
}
"#;
    let seed = parse_seed_source(source, "users_seed.bcl").expect("seed should parse");

    assert_eq!(seed.name, "users");
    assert_eq!(seed.table, "users");
    assert_eq!(seed.rows, 25);
    assert_eq!(seed.combine, vec!["first", "last"]);
    assert_eq!(seed.fields.len(), 7);
    assert!(seed.fields[0].unique);
    assert_eq!(seed.fields[3].data_type.as_deref(), Some("int"));
    assert_eq!(
        seed.fields[6].value,
        SqlValue::Integer(100),
        "numeric literals stay typed"
    );
}

#[test]
fn seed_without_table_is_rejected() {
    let error = parse_seed_source("Seed \"x\" { rows = 1 }", "x.bcl").expect_err("must fail");
    assert!(matches!(error, Error::Parse { .. }));
}

#[test]
fn document_parser_keeps_unmatched_keys_accessible() {
    let document = parse_document(
        "Block \"label\" { key = \"value\", Nested { flag = true } }",
        "doc.bcl",
    )
    .expect("document should parse");

    let block = &document.blocks[0];
    assert_eq!(block.keyword, "Block");
    assert_eq!(block.label.as_deref(), Some("label"));
    assert_eq!(block.attr("key").and_then(|v| v.as_str()), Some("value"));
    // Key lookup tolerates casing/underscore differences.
    assert_eq!(block.attr("KEY").and_then(|v| v.as_str()), Some("value"));
    assert_eq!(block.blocks_named("nested").count(), 1);
}
