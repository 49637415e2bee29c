use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;

use crate::{Error, Result};

/// Writes a skeleton migration at `<dir>/<unix_ts>_<name>.bcl`. The
/// template follows the name's tokens: a `create`/`alter`/`drop` action
/// and a trailing `table`/`view`/`function`/`trigger` object kind.
pub fn create_migration_scaffold(dir: &Path, name: &str) -> Result<PathBuf> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("migration name must not be empty"));
    }

    fs::create_dir_all(dir).map_err(|source| Error::io(dir, source))?;
    let path = dir.join(format!("{}_{name}.bcl", Utc::now().timestamp()));
    fs::write(&path, migration_template(name)).map_err(|source| Error::io(&path, source))?;
    Ok(path)
}

/// Writes a skeleton seed for `table` under the seed directory.
pub fn create_seed_scaffold(dir: &Path, table: &str) -> Result<PathBuf> {
    if table.trim().is_empty() {
        return Err(Error::invalid_input("seed table must not be empty"));
    }

    fs::create_dir_all(dir).map_err(|source| Error::io(dir, source))?;
    let path = dir.join(format!("{table}_seed.bcl"));
    fs::write(&path, seed_template(table)).map_err(|source| Error::io(&path, source))?;
    Ok(path)
}

fn migration_template(name: &str) -> String {
    let tokens: Vec<&str> = name.split('_').collect();
    let action = match tokens.first().copied() {
        Some("alter") => "alter",
        Some("drop") => "drop",
        _ => "create",
    };
    let object_kind = match tokens.last().copied() {
        Some("view") => "view",
        Some("function") => "function",
        Some("trigger") => "trigger",
        _ => "table",
    };
    let object = object_name(&tokens);

    let body = match (action, object_kind) {
        ("create", "view") => format!(
            r#"  Up {{
    CreateView "{object}" {{
      definition = "SELECT 1"
    }}
  }}

  Down {{
    DropView "{object}" {{ if_exists = true }}
  }}"#
        ),
        ("create", "function") => format!(
            r#"  Up {{
    CreateFunction "{object}" {{
      returns = "void"
      language = "plpgsql"
      body = "BEGIN RETURN; END;"
    }}
  }}

  Down {{
    DropFunction "{object}" {{ if_exists = true }}
  }}"#
        ),
        ("create", "trigger") => format!(
            r#"  Up {{
    CreateTrigger "{object}" {{
      table = "change_me"
      timing = "before"
      event = "insert"
      body = "EXECUTE FUNCTION change_me()"
    }}
  }}

  Down {{
    DropTrigger "{object}" {{ table = "change_me", if_exists = true }}
  }}"#
        ),
        ("alter", _) => format!(
            r#"  Up {{
    AlterTable "{object}" {{
      AddField "new_column" {{ type = string, size = 255, nullable = true }}
    }}
  }}

  Down {{
    AlterTable "{object}" {{
      DropField "new_column" {{}}
    }}
  }}"#
        ),
        ("drop", _) => format!(
            r#"  Up {{
    DropTable "{object}" {{ if_exists = true }}
  }}

  Down {{}}"#
        ),
        _ => format!(
            r#"  Up {{
    CreateTable "{object}" {{
      Field "id" {{ type = integer, primary_key = true, auto_increment = true }}
      Field "created_at" {{ type = timestamp, default = "now()" }}
    }}
  }}

  Down {{
    DropTable "{object}" {{ if_exists = true }}
  }}"#
        ),
    };

    format!(
        r#"Migration "{name}" {{
  Version = "1.0.0"
  Description = ""

{body}
}}
"#
    )
}

fn object_name(tokens: &[&str]) -> String {
    let without_action = match tokens.first().copied() {
        Some("create" | "alter" | "drop") => &tokens[1..],
        _ => tokens,
    };
    let without_kind = match without_action.last().copied() {
        Some("table" | "view" | "function" | "trigger") => {
            &without_action[..without_action.len() - 1]
        }
        _ => without_action,
    };
    if without_kind.is_empty() {
        return "change_me".to_string();
    }
    without_kind.join("_")
}

fn seed_template(table: &str) -> String {
    format!(
        r#"Seed "{table}" {{
  table = "{table}"
  rows = 10

  Field "name" {{ value = "fake_name" }}
  Field "created_at" {{ value = "fake_datetime" }}
}}
"#
    )
}
