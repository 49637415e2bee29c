use stratum_core::{Config, HistoryStoreKind};

#[test]
fn defaults_are_complete() {
    let config = Config::default();
    assert_eq!(config.database.driver, "sqlite");
    assert_eq!(config.migration.directory, "migrations");
    assert_eq!(config.migration.table_name, "migrations");
    assert_eq!(config.migration.history_store, HistoryStoreKind::Database);
    assert_eq!(config.seed.default_rows, 10);
    assert!(config.validation.enabled);
    assert_eq!(config.validation.max_identifier_length, 64);
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let config = Config::from_json(
        r#"{"database": {"driver": "postgres", "host": "db.internal", "username": "app"}}"#,
        "inline",
    )
    .expect("parse");

    assert_eq!(config.database.driver, "postgres");
    assert_eq!(config.database.host, "db.internal");
    assert_eq!(config.database.database, "stratum.db", "default retained");
    assert_eq!(config.migration.directory, "migrations");
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(Config::from_json("{not json", "inline").is_err());
}

#[test]
fn postgres_dsn_shape() {
    let mut config = Config::default();
    config.database.driver = "postgres".to_string();
    config.database.host = "db".to_string();
    config.database.username = "app".to_string();
    config.database.password = "secret".to_string();
    config.database.database = "appdb".to_string();

    assert_eq!(
        config.database.dsn(),
        "host=db port=5432 user=app dbname=appdb password=secret sslmode=disable"
    );
}

#[test]
fn mysql_dsn_shape() {
    let mut config = Config::default();
    config.database.driver = "mysql".to_string();
    config.database.host = "db".to_string();
    config.database.username = "app".to_string();
    config.database.password = "secret".to_string();
    config.database.database = "appdb".to_string();

    assert_eq!(
        config.database.dsn(),
        "app:secret@tcp(db:3306)/appdb?charset=utf8mb4"
    );
}

#[test]
fn sqlite_dsn_is_the_database_path() {
    let mut config = Config::default();
    config.database.database = "data/app.db".to_string();
    assert_eq!(config.database.dsn(), "data/app.db");
}

#[test]
fn explicit_port_overrides_the_driver_default() {
    let mut config = Config::default();
    config.database.driver = "postgres".to_string();
    config.database.port = 6543;
    assert_eq!(config.database.effective_port(), 6543);
}

#[test]
fn config_round_trips_through_json() {
    let mut config = Config::default();
    config.database.driver = "mysql".to_string();
    config.migration.history_store = HistoryStoreKind::File;
    config.validation.forbidden_names = vec!["tmp".to_string()];

    let rendered = config.to_pretty_json();
    let reparsed = Config::from_json(&rendered, "inline").expect("reparse");
    assert_eq!(reparsed, config);
}
