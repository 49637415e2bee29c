use crate::{Error, Result};

pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// SQL reserved words rejected for portable identifiers. The check is
/// case-insensitive.
pub const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "any", "as", "asc", "between", "by", "case", "cast", "check", "column",
    "constraint", "create", "cross", "current_date", "current_time", "current_timestamp",
    "database", "default", "delete", "desc", "distinct", "drop", "else", "end", "except", "exists",
    "foreign", "from", "full", "function", "grant", "group", "having", "in", "index", "inner",
    "insert", "intersect", "into", "is", "join", "key", "left", "like", "limit", "not", "null",
    "offset", "on", "or", "order", "outer", "primary", "procedure", "references", "revoke",
    "right", "schema", "select", "set", "table", "then", "to", "trigger", "union", "unique",
    "update", "values", "view", "when", "where",
];

/// Validates a portable identifier: `^[A-Za-z_][A-Za-z0-9_]*$`, at most
/// `max_length` characters, and not a reserved word.
pub fn validate_identifier(ident: &str, max_length: usize) -> Result<()> {
    if ident.is_empty() {
        return Err(Error::invalid_input("identifier must not be empty"));
    }
    if ident.len() > max_length {
        return Err(Error::invalid_input(format!(
            "identifier `{ident}` exceeds {max_length} characters"
        )));
    }

    let mut chars = ident.chars();
    let first = chars.next().unwrap_or_default();
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(Error::invalid_input(format!(
            "identifier `{ident}` must start with a letter or underscore"
        )));
    }
    if let Some(bad) = chars.find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_')) {
        return Err(Error::invalid_input(format!(
            "identifier `{ident}` contains invalid character `{bad}`"
        )));
    }

    if is_reserved_word(ident) {
        return Err(Error::invalid_input(format!(
            "identifier `{ident}` is a reserved word"
        )));
    }

    Ok(())
}

pub fn is_reserved_word(ident: &str) -> bool {
    let lowered = ident.to_ascii_lowercase();
    RESERVED_WORDS.binary_search(&lowered.as_str()).is_ok()
}
