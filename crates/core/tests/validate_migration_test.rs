use stratum_core::{
    CreateTable, Field, Migration, ValidationConfig, validate_migration,
};

fn migration_with_table(table: CreateTable) -> Migration {
    let mut migration = Migration::named("test");
    migration.description = "a test migration".to_string();
    migration.up.create_tables.push(table);
    migration
}

fn table_with_field(field: Field) -> CreateTable {
    CreateTable {
        name: "users".to_string(),
        fields: vec![field],
        primary_key: Vec::new(),
    }
}

#[test]
fn valid_migration_passes() {
    let migration = migration_with_table(table_with_field(Field::new("id", "integer")));
    validate_migration(&migration, &ValidationConfig::default()).expect("should validate");
}

#[test]
fn disabled_validation_accepts_anything() {
    let migration = migration_with_table(table_with_field(Field::new("1bad", "integer")));
    let config = ValidationConfig {
        enabled: false,
        ..ValidationConfig::default()
    };
    validate_migration(&migration, &config).expect("validation disabled");
}

#[test]
fn reserved_word_identifiers_are_rejected() {
    let migration = migration_with_table(table_with_field(Field::new("select", "integer")));
    assert!(validate_migration(&migration, &ValidationConfig::default()).is_err());
}

#[test]
fn forbidden_names_are_rejected_case_insensitively() {
    let migration = migration_with_table(table_with_field(Field::new("Password", "string")));
    let config = ValidationConfig {
        forbidden_names: vec!["password".to_string()],
        ..ValidationConfig::default()
    };
    assert!(validate_migration(&migration, &config).is_err());
}

#[test]
fn allowed_type_list_restricts_data_types() {
    let migration = migration_with_table(table_with_field(Field::new("id", "uuid")));
    let config = ValidationConfig {
        allowed_data_types: vec!["integer".to_string(), "string".to_string()],
        ..ValidationConfig::default()
    };
    assert!(validate_migration(&migration, &config).is_err());
}

#[test]
fn strict_mode_rejects_passthrough_types() {
    let migration = migration_with_table(table_with_field(Field::new("location", "geography")));
    let config = ValidationConfig {
        strict_mode: true,
        ..ValidationConfig::default()
    };
    assert!(validate_migration(&migration, &config).is_err());

    // Outside strict mode the unknown type passes through.
    validate_migration(&migration, &ValidationConfig::default()).expect("non-strict passes");
}

#[test]
fn require_description_enforces_a_description() {
    let mut migration = migration_with_table(table_with_field(Field::new("id", "integer")));
    migration.description = String::new();
    let config = ValidationConfig {
        require_description: true,
        ..ValidationConfig::default()
    };
    assert!(validate_migration(&migration, &config).is_err());
}

#[test]
fn custom_identifier_length_cap_applies() {
    let migration = migration_with_table(table_with_field(Field::new("a_rather_long_name", "integer")));
    let config = ValidationConfig {
        max_identifier_length: 8,
        ..ValidationConfig::default()
    };
    assert!(validate_migration(&migration, &config).is_err());
}
