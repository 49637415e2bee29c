use std::process::Command;

fn run_stratum(dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_stratum"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run stratum: {error}"))
}

#[test]
fn help_lists_the_command_surface() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_stratum(dir.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in [
        "make:migration",
        "migrate",
        "migration:rollback",
        "migration:reset",
        "migration:validate",
        "status",
        "make:seed",
        "db:seed",
        "history",
        "config:init",
        "config:validate",
        "config:show",
        "db:reset",
    ] {
        assert!(stdout.contains(command), "help should list `{command}`");
    }
}

#[test]
fn unknown_subcommand_exits_nonzero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_stratum(dir.path(), &["explode"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn config_init_writes_and_validates() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = run_stratum(dir.path(), &["config:init"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(dir.path().join("stratum.json").exists());

    let output = run_stratum(dir.path(), &["config:validate"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");

    // A second init refuses to clobber the existing file.
    let output = run_stratum(dir.path(), &["config:init"]);
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn config_show_prints_the_dsn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_stratum(dir.path(), &["config:show"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"driver\""));
    assert!(stdout.contains("dsn:"));
}

#[test]
fn make_migration_scaffolds_into_the_configured_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_stratum(dir.path(), &["make:migration", "create_users_table"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");

    let entries: Vec<_> = std::fs::read_dir(dir.path().join("migrations"))
        .expect("migrations dir")
        .filter_map(|entry| entry.ok())
        .collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name();
    let name = name.to_string_lossy();
    assert!(name.ends_with("_create_users_table.bcl"), "got {name}");
}

#[test]
fn make_seed_scaffolds_into_the_seed_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_stratum(dir.path(), &["make:seed", "users"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(
        dir.path()
            .join("migrations/seeds/users_seed.bcl")
            .exists()
    );
}
