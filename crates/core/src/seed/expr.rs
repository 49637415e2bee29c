use std::collections::{BTreeMap, HashMap};

use rhai::{AST, Dynamic, Engine, Map, Scope};

use crate::{Error, Result, SqlValue};

/// Evaluator for `expr:` seed fields. Programs are compiled once per
/// source text and reused across rows; resolved sibling fields are
/// exposed to the program as `<name>.value`.
pub struct ExprEvaluator {
    engine: Engine,
    cache: HashMap<String, AST>,
}

impl Default for ExprEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprEvaluator {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
            cache: HashMap::new(),
        }
    }

    /// Field names a program references via `<name>.value`.
    pub fn dependencies(source: &str) -> Vec<String> {
        let chars: Vec<char> = source.chars().collect();
        let mut deps = Vec::new();
        let mut index = 0usize;

        while index < chars.len() {
            let ch = chars[index];
            if ch.is_ascii_alphabetic() || ch == '_' {
                let start = index;
                while index < chars.len()
                    && (chars[index].is_ascii_alphanumeric() || chars[index] == '_')
                {
                    index += 1;
                }
                let preceded_by_dot = start > 0 && chars[start - 1] == '.';
                let ident: String = chars[start..index].iter().collect();
                if !preceded_by_dot
                    && source[char_offset(&chars, index)..].starts_with(".value")
                    && !deps.contains(&ident)
                {
                    deps.push(ident);
                }
            } else {
                index += 1;
            }
        }

        deps
    }

    pub fn eval(
        &mut self,
        source: &str,
        resolved: &BTreeMap<String, SqlValue>,
    ) -> Result<SqlValue> {
        let ast = match self.cache.entry(source.to_string()) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                let program = rewrite_ternary(source);
                let ast = self.engine.compile(&program).map_err(|err| {
                    Error::invalid_input(format!("invalid expr `{source}`: {err}"))
                })?;
                entry.insert(ast)
            }
        };

        let mut scope = Scope::new();
        for (name, value) in resolved {
            let mut map = Map::new();
            map.insert("value".into(), to_dynamic(value));
            scope.push(name.clone(), map);
        }

        let result: Dynamic = self
            .engine
            .eval_ast_with_scope(&mut scope, ast)
            .map_err(|err| Error::invalid_input(format!("expr `{source}` failed: {err}")))?;
        Ok(from_dynamic(result))
    }
}

/// Rewrites `cond ? a : b` (the migration format's conditional syntax)
/// into the engine's `if cond { a } else { b }`, recursing into both
/// branches for chained conditionals.
fn rewrite_ternary(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let Some(question) = top_level_position(&chars, '?') else {
        return source.to_string();
    };

    let condition: String = chars[..question].iter().collect();
    let rest = &chars[question + 1..];

    let mut depth = 1usize;
    let mut split = None;
    let mut index = 0usize;
    let mut in_string: Option<char> = None;
    while index < rest.len() {
        let ch = rest[index];
        match in_string {
            Some(quote) => {
                if ch == quote {
                    in_string = None;
                }
            }
            None => match ch {
                '\'' | '"' => in_string = Some(ch),
                '?' => depth += 1,
                ':' => {
                    depth -= 1;
                    if depth == 0 {
                        split = Some(index);
                        break;
                    }
                }
                _ => {}
            },
        }
        index += 1;
    }

    let Some(split) = split else {
        return source.to_string();
    };

    let then_branch: String = rest[..split].iter().collect();
    let else_branch: String = rest[split + 1..].iter().collect();
    format!(
        "if {} {{ {} }} else {{ {} }}",
        condition.trim(),
        rewrite_ternary(then_branch.trim()),
        rewrite_ternary(else_branch.trim()),
    )
}

fn top_level_position(chars: &[char], wanted: char) -> Option<usize> {
    let mut in_string: Option<char> = None;
    for (index, ch) in chars.iter().enumerate() {
        match in_string {
            Some(quote) => {
                if *ch == quote {
                    in_string = None;
                }
            }
            None => {
                if *ch == '\'' || *ch == '"' {
                    in_string = Some(*ch);
                } else if *ch == wanted {
                    return Some(index);
                }
            }
        }
    }
    None
}

fn char_offset(chars: &[char], index: usize) -> usize {
    chars[..index].iter().map(|ch| ch.len_utf8()).sum()
}

fn to_dynamic(value: &SqlValue) -> Dynamic {
    match value {
        SqlValue::Text(value) => Dynamic::from(value.clone()),
        SqlValue::Integer(value) => Dynamic::from(*value),
        SqlValue::Float(value) => Dynamic::from(*value),
        SqlValue::Bool(value) => Dynamic::from(*value),
        SqlValue::Null => Dynamic::UNIT,
    }
}

fn from_dynamic(value: Dynamic) -> SqlValue {
    if value.is_unit() {
        return SqlValue::Null;
    }
    if let Some(flag) = value.clone().try_cast::<bool>() {
        return SqlValue::Bool(flag);
    }
    if let Some(int) = value.clone().try_cast::<i64>() {
        return SqlValue::Integer(int);
    }
    if let Some(float) = value.clone().try_cast::<f64>() {
        return SqlValue::Float(float);
    }
    SqlValue::Text(value.to_string())
}
