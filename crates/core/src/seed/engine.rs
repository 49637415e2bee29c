use std::collections::{BTreeMap, HashMap, HashSet};

use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use super::{
    expr::ExprEvaluator,
    faker::generate_fake,
    model::{Seed, SeedField},
};
use crate::{Dialect, Error, NamedArgs, Result, SqlValue};

const UNIQUE_RETRY_LIMIT: usize = 100;

/// One parameterised insert produced for one generated row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowInsert {
    pub sql: String,
    pub args: NamedArgs,
}

/// Generates rows for seed definitions: immediate fields first
/// (literals and `fake_*` tokens), then `expr:` fields in dependency
/// order, with unique/combine collision retries bounded per row.
pub struct SeedEngine<'a> {
    dialect: &'a dyn Dialect,
    evaluator: ExprEvaluator,
    rng: StdRng,
}

impl<'a> SeedEngine<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            evaluator: ExprEvaluator::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn generate_rows(&mut self, seed: &Seed, rows: usize) -> Result<Vec<RowInsert>> {
        if seed.table.trim().is_empty() {
            return Err(Error::invalid_input(format!(
                "seed `{}` requires a table",
                seed.name
            )));
        }
        if seed.fields.is_empty() {
            return Err(Error::invalid_input(format!(
                "seed `{}` must define at least one field",
                seed.name
            )));
        }

        let columns: Vec<String> = seed.fields.iter().map(|field| field.name.clone()).collect();
        let mut seen_unique: HashMap<&str, HashSet<String>> = HashMap::new();
        let mut seen_combined: HashSet<String> = HashSet::new();
        let mut inserts = Vec::with_capacity(rows);

        for row_index in 0..rows {
            let mut attempts = 0usize;
            let resolved = loop {
                let candidate = self.generate_row(seed)?;
                if !self.conflicts(seed, &candidate, &seen_unique, &seen_combined) {
                    break candidate;
                }
                attempts += 1;
                if attempts >= UNIQUE_RETRY_LIMIT {
                    return Err(Error::invalid_input(format!(
                        "seed `{}` could not satisfy unique constraints after {UNIQUE_RETRY_LIMIT} attempts (row {row_index})",
                        seed.name
                    )));
                }
            };

            for field in &seed.fields {
                if field.unique
                    && let Some(value) = resolved.get(field.name.as_str())
                {
                    seen_unique
                        .entry(field.name.as_str())
                        .or_default()
                        .insert(value.render());
                }
            }
            if !seed.combine.is_empty() {
                seen_combined.insert(combined_key(&seed.combine, &resolved));
            }

            let values: Vec<SqlValue> = columns
                .iter()
                .map(|column| resolved.get(column).cloned().unwrap_or(SqlValue::Null))
                .collect();
            let (sql, args) = self.dialect.insert_named(&seed.table, &columns, values);
            inserts.push(RowInsert { sql, args });
        }

        debug!(seed = %seed.name, rows, "generated seed rows");
        Ok(inserts)
    }

    fn generate_row(&mut self, seed: &Seed) -> Result<BTreeMap<String, SqlValue>> {
        let mut resolved: BTreeMap<String, SqlValue> = BTreeMap::new();
        let mut pending: Vec<&SeedField> = Vec::new();

        for field in &seed.fields {
            if field.expr_source().is_some() {
                pending.push(field);
                continue;
            }
            let value = self.immediate_value(field)?;
            resolved.insert(field.name.clone(), value);
        }

        while !pending.is_empty() {
            let mut progressed = false;
            let mut still_pending = Vec::new();

            for field in pending {
                let source = field.expr_source().unwrap_or_default();
                let deps = ExprEvaluator::dependencies(source);
                if deps.iter().all(|dep| resolved.contains_key(dep)) {
                    let value = self.evaluator.eval(source, &resolved)?;
                    let value = cast_value(value, field.data_type.as_deref())?;
                    resolved.insert(field.name.clone(), value);
                    progressed = true;
                } else {
                    still_pending.push(field);
                }
            }

            if !progressed && !still_pending.is_empty() {
                return Err(Error::ExprResolution {
                    seed: seed.name.clone(),
                    fields: still_pending
                        .iter()
                        .map(|field| field.name.clone())
                        .collect(),
                });
            }
            pending = still_pending;
        }

        Ok(resolved)
    }

    fn immediate_value(&mut self, field: &SeedField) -> Result<SqlValue> {
        let value = if let Some(token) = field.fake_token() {
            generate_fake(token, field.size, &mut self.rng)?
        } else {
            match &field.value {
                SqlValue::Text(raw) => SqlValue::Text(substitute_refs(raw)),
                other => other.clone(),
            }
        };
        cast_value(value, field.data_type.as_deref())
    }

    fn conflicts(
        &self,
        seed: &Seed,
        resolved: &BTreeMap<String, SqlValue>,
        seen_unique: &HashMap<&str, HashSet<String>>,
        seen_combined: &HashSet<String>,
    ) -> bool {
        for field in &seed.fields {
            if !field.unique {
                continue;
            }
            if let (Some(value), Some(seen)) = (
                resolved.get(field.name.as_str()),
                seen_unique.get(field.name.as_str()),
            ) && seen.contains(&value.render())
            {
                return true;
            }
        }
        !seed.combine.is_empty() && seen_combined.contains(&combined_key(&seed.combine, resolved))
    }
}

fn combined_key(combine: &[String], resolved: &BTreeMap<String, SqlValue>) -> String {
    combine
        .iter()
        .map(|name| {
            resolved
                .get(name)
                .map(SqlValue::render)
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("\u{1}")
}

/// `${ref(x)}` placeholder substitution: replaced by the bare `x`
/// literal until the reference mini-syntax grows real semantics.
fn substitute_refs(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${ref(") {
        output.push_str(&rest[..start]);
        let after = &rest[start + "${ref(".len()..];
        match after.find(")}") {
            Some(end) => {
                output.push_str(&after[..end]);
                rest = &after[end + 2..];
            }
            None => {
                output.push_str(&rest[start..]);
                return output;
            }
        }
    }
    output.push_str(rest);
    output
}

fn cast_value(value: SqlValue, data_type: Option<&str>) -> Result<SqlValue> {
    let Some(data_type) = data_type else {
        return Ok(value);
    };

    match data_type.to_ascii_lowercase().as_str() {
        "int" | "integer" => to_integer(value),
        "number" => match to_integer(value.clone()) {
            Ok(int) => Ok(int),
            Err(_) => to_float(value),
        },
        "bool" | "boolean" => to_bool(value),
        _ => Ok(value),
    }
}

fn to_integer(value: SqlValue) -> Result<SqlValue> {
    match value {
        SqlValue::Integer(_) => Ok(value),
        SqlValue::Float(float) => Ok(SqlValue::Integer(float as i64)),
        SqlValue::Bool(flag) => Ok(SqlValue::Integer(i64::from(flag))),
        SqlValue::Text(raw) => raw
            .trim()
            .parse::<i64>()
            .map(SqlValue::Integer)
            .map_err(|_| Error::invalid_input(format!("cannot cast `{raw}` to integer"))),
        SqlValue::Null => Ok(SqlValue::Null),
    }
}

fn to_float(value: SqlValue) -> Result<SqlValue> {
    match value {
        SqlValue::Float(_) => Ok(value),
        SqlValue::Integer(int) => Ok(SqlValue::Float(int as f64)),
        SqlValue::Text(raw) => raw
            .trim()
            .parse::<f64>()
            .map(SqlValue::Float)
            .map_err(|_| Error::invalid_input(format!("cannot cast `{raw}` to number"))),
        SqlValue::Bool(flag) => Ok(SqlValue::Float(f64::from(u8::from(flag)))),
        SqlValue::Null => Ok(SqlValue::Null),
    }
}

fn to_bool(value: SqlValue) -> Result<SqlValue> {
    match value {
        SqlValue::Bool(_) => Ok(value),
        SqlValue::Integer(int) => Ok(SqlValue::Bool(int != 0)),
        SqlValue::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(SqlValue::Bool(true)),
            "false" | "0" | "no" => Ok(SqlValue::Bool(false)),
            other => Err(Error::invalid_input(format!(
                "cannot cast `{other}` to boolean"
            ))),
        },
        SqlValue::Float(float) => Ok(SqlValue::Bool(float != 0.0)),
        SqlValue::Null => Ok(SqlValue::Null),
    }
}
