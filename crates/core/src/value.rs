use std::collections::BTreeMap;

use crate::{Error, Result};

/// A scalar bound into a parameterised statement or read back from a
/// text-cast query column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Literal rendering used by dry-run output and error context.
    pub fn render(&self) -> String {
        match self {
            Self::Text(value) => format!("'{}'", value.replace('\'', "''")),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Null => "NULL".to_string(),
        }
    }
}

/// Named arguments for the first statement of a driver `apply` call.
/// Keys are bare column names without the `:` placeholder prefix.
pub type NamedArgs = BTreeMap<String, SqlValue>;

/// Rewrites `:name` placeholders into client-positional ones and returns
/// the bound values in placeholder order. `placeholder` receives the
/// 1-based position (`$n` for postgres, `?` for mysql and sqlite).
///
/// The scan skips quoted regions and leaves `::` casts untouched.
pub fn bind_positional(
    sql: &str,
    args: &NamedArgs,
    mut placeholder: impl FnMut(usize) -> String,
) -> Result<(String, Vec<SqlValue>)> {
    let mut rewritten = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut chars = sql.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\'' if !in_double => {
                in_single = !in_single;
                rewritten.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                rewritten.push(ch);
            }
            ':' if !in_single && !in_double => {
                if chars.peek() == Some(&':') {
                    rewritten.push_str("::");
                    chars.next();
                    continue;
                }
                let mut name = String::new();
                while let Some(next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || *next == '_' {
                        name.push(*next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    rewritten.push(ch);
                    continue;
                }
                let value = args.get(&name).ok_or_else(|| {
                    Error::invalid_input(format!("no value bound for placeholder `:{name}`"))
                })?;
                values.push(value.clone());
                rewritten.push_str(&placeholder(values.len()));
            }
            _ => rewritten.push(ch),
        }
    }

    Ok((rewritten, values))
}
