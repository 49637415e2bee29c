use std::{fs, path::Path, process::Command};

const USERS_MIGRATION: &str = r#"Migration "users" {
  Version = "1.0.0"
  Description = "create users"

  Up {
    CreateTable "users" {
      Field "id" { type = integer, primary_key = true, auto_increment = true }
      Field "email" { type = string, size = 255, unique = true }
      Field "created_at" { type = timestamp, default = "now()" }
    }
  }

  Down {
    DropTable "users" { if_exists = true }
  }
}
"#;

const USERS_SEED: &str = r#"Seed "users" {
  table = "users"
  rows = 3

  Field "email" { value = "fake_email", unique = true }
  Field "created_at" { value = "fake_datetime" }
}
"#;

fn run_stratum(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_stratum"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run stratum: {error}"))
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn setup_workspace(dir: &Path) {
    fs::write(
        dir.join("stratum.json"),
        r#"{
  "database": { "driver": "sqlite", "database": "app.db" },
  "migration": { "directory": "migrations" },
  "seed": { "directory": "migrations/seeds" }
}"#,
    )
    .expect("write config");
    fs::create_dir_all(dir.join("migrations/seeds")).expect("dirs");
    fs::write(
        dir.join("migrations/1700000000_users.bcl"),
        USERS_MIGRATION,
    )
    .expect("write migration");
}

#[test]
fn migrate_status_rollback_cycle_on_a_real_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    setup_workspace(dir.path());

    let output = run_stratum(dir.path(), &["migrate"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(stdout(&output).contains("applied 1 migration(s)"));
    assert!(dir.path().join("app.db").exists());

    let output = run_stratum(dir.path(), &["status"]);
    assert!(stdout(&output).contains("applied: 1, pending: 0"), "{output:?}");

    // Re-running is a no-op while the file is unchanged.
    let output = run_stratum(dir.path(), &["migrate"]);
    assert!(stdout(&output).contains("applied 0 migration(s), skipped 1"));

    let output = run_stratum(dir.path(), &["history"]);
    assert!(stdout(&output).contains("users"), "{output:?}");

    let output = run_stratum(dir.path(), &["migration:rollback", "--step", "1"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(stdout(&output).contains("rolled back 1 migration(s)"));

    let output = run_stratum(dir.path(), &["status"]);
    assert!(stdout(&output).contains("applied: 0, pending: 1"), "{output:?}");
}

#[test]
fn drift_is_fatal_and_leaves_history_intact() {
    let dir = tempfile::tempdir().expect("tempdir");
    setup_workspace(dir.path());

    assert_eq!(run_stratum(dir.path(), &["migrate"]).status.code(), Some(0));

    let tampered = USERS_MIGRATION.replace("create users", "create users!!");
    fs::write(
        dir.path().join("migrations/1700000000_users.bcl"),
        tampered,
    )
    .expect("tamper");

    let output = run_stratum(dir.path(), &["migrate"]);
    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("modified after being applied"),
        "stderr: {stderr}"
    );

    let output = run_stratum(dir.path(), &["status"]);
    assert!(stdout(&output).contains("applied: 1"), "{output:?}");
}

#[test]
fn seeds_insert_rows_through_the_parameterised_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    setup_workspace(dir.path());
    fs::write(dir.path().join("migrations/seeds/users_seed.bcl"), USERS_SEED)
        .expect("write seed");

    assert_eq!(run_stratum(dir.path(), &["migrate"]).status.code(), Some(0));

    let output = run_stratum(dir.path(), &["db:seed"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(stdout(&output).contains("seeded 1 table(s), 3 row(s)"));

    // Truncate-then-reseed keeps the table at the seeded row count.
    let output = run_stratum(dir.path(), &["db:seed", "--truncate", "--rows", "5"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(stdout(&output).contains("seeded 1 table(s), 5 row(s)"));
}

#[test]
fn db_reset_reapplies_from_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    setup_workspace(dir.path());

    assert_eq!(run_stratum(dir.path(), &["migrate"]).status.code(), Some(0));

    let output = run_stratum(dir.path(), &["db:reset"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(
        stdout(&output).contains("reset 1 migration(s), re-applied 1"),
        "{output:?}"
    );
}

#[test]
fn migration_validate_reports_pending_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    setup_workspace(dir.path());

    let output = run_stratum(dir.path(), &["migration:validate"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let stdout = stdout(&output);
    assert!(stdout.contains("1 migration(s) pending"));
    assert!(stdout.contains("users"));
}
