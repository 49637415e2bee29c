use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use postgres::{
    Client, NoTls,
    types::{ToSql, Type},
};
use stratum_core::{
    DatabaseConfig, DatabaseDriver, Error, NamedArgs, Result, SqlValue, TransactionConfig,
    bind_positional, split_statements,
};

const CONNECT_SQL: &str = "CONNECT postgres";

pub(crate) struct PostgresDriver {
    client: Client,
}

pub(crate) fn connect(config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>> {
    let mut pg_config = postgres::Config::new();
    pg_config.host(&config.host);
    pg_config.port(config.effective_port());
    if !config.username.is_empty() {
        pg_config.user(&config.username);
    }
    if !config.password.is_empty() {
        pg_config.password(&config.password);
    }
    pg_config.dbname(&config.database);
    if config.timeout > 0 {
        pg_config.connect_timeout(Duration::from_secs(config.timeout));
    }

    let client = pg_config
        .connect(NoTls)
        .map_err(|source| Error::db(CONNECT_SQL, source))?;
    Ok(Box::new(PostgresDriver { client }))
}

impl DatabaseDriver for PostgresDriver {
    fn name(&self) -> &str {
        crate::DIALECT_NAME
    }

    fn apply(
        &mut self,
        statements: &[String],
        named_args: Option<&NamedArgs>,
        transaction: Option<&TransactionConfig>,
    ) -> Result<()> {
        let mut tx = self
            .client
            .transaction()
            .map_err(|source| Error::db("BEGIN", source))?;

        if let Some(level) = transaction.and_then(|config| config.isolation_level.as_deref()) {
            let set_level = format!("SET TRANSACTION ISOLATION LEVEL {}", level.to_uppercase());
            tx.batch_execute(&set_level)
                .map_err(|source| Error::db(set_level.clone(), source))?;
        }

        let mut pending_args = named_args;
        for statement in statements {
            for piece in split_statements(statement) {
                if let Some(args) = pending_args.take() {
                    execute_bound(&mut tx, &piece, args)?;
                } else {
                    tx.batch_execute(&piece)
                        .map_err(|source| Error::db(piece.clone(), source))?;
                }
            }
        }

        tx.commit().map_err(|source| Error::db("COMMIT", source))
    }

    fn query_strings(&mut self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        let rows = self
            .client
            .query(sql, &[])
            .map_err(|source| Error::db(sql, source))?;

        let mut output = Vec::with_capacity(rows.len());
        for row in rows {
            let mut columns = Vec::with_capacity(row.len());
            for index in 0..row.len() {
                columns.push(
                    row.try_get::<_, Option<String>>(index)
                        .map_err(|source| Error::db(sql, source))?,
                );
            }
            output.push(columns);
        }
        Ok(output)
    }
}

fn execute_bound(tx: &mut postgres::Transaction<'_>, sql: &str, args: &NamedArgs) -> Result<()> {
    let (rewritten, values) = bind_positional(sql, args, |position| format!("${position}"))?;

    let statement = tx
        .prepare(&rewritten)
        .map_err(|source| Error::db(rewritten.clone(), source))?;
    let expected = statement.params();

    let mut params: Vec<Box<dyn ToSql + Sync>> = Vec::with_capacity(values.len());
    for (value, ty) in values.iter().zip(expected) {
        params.push(adapt_param(value, ty)?);
    }
    let param_refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|param| param.as_ref()).collect();

    tx.execute(&statement, &param_refs)
        .map_err(|source| Error::db(rewritten.clone(), source))?;
    Ok(())
}

/// The extended protocol binds parameters by the statement's declared
/// types, so generated values (all text-ish on the engine side) are
/// converted to the Rust type each column expects.
fn adapt_param(value: &SqlValue, ty: &Type) -> Result<Box<dyn ToSql + Sync>> {
    let boxed: Box<dyn ToSql + Sync> = if *ty == Type::INT2 {
        Box::new(to_integer(value)?.map(|int| int as i16))
    } else if *ty == Type::INT4 {
        Box::new(to_integer(value)?.map(|int| int as i32))
    } else if *ty == Type::INT8 {
        Box::new(to_integer(value)?)
    } else if *ty == Type::FLOAT4 {
        Box::new(to_float(value)?.map(|float| float as f32))
    } else if *ty == Type::FLOAT8 {
        Box::new(to_float(value)?)
    } else if *ty == Type::BOOL {
        Box::new(to_bool(value)?)
    } else if *ty == Type::TIMESTAMP {
        Box::new(to_datetime(value)?)
    } else if *ty == Type::DATE {
        Box::new(to_date(value)?)
    } else if *ty == Type::TIME {
        Box::new(to_time(value)?)
    } else {
        Box::new(to_text(value))
    };
    Ok(boxed)
}

fn to_integer(value: &SqlValue) -> Result<Option<i64>> {
    match value {
        SqlValue::Integer(int) => Ok(Some(*int)),
        SqlValue::Float(float) => Ok(Some(*float as i64)),
        SqlValue::Bool(flag) => Ok(Some(i64::from(*flag))),
        SqlValue::Text(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| bind_error(text, "integer")),
        SqlValue::Null => Ok(None),
    }
}

fn to_float(value: &SqlValue) -> Result<Option<f64>> {
    match value {
        SqlValue::Float(float) => Ok(Some(*float)),
        SqlValue::Integer(int) => Ok(Some(*int as f64)),
        SqlValue::Text(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| bind_error(text, "float")),
        SqlValue::Bool(flag) => Ok(Some(f64::from(u8::from(*flag)))),
        SqlValue::Null => Ok(None),
    }
}

fn to_bool(value: &SqlValue) -> Result<Option<bool>> {
    match value {
        SqlValue::Bool(flag) => Ok(Some(*flag)),
        SqlValue::Integer(int) => Ok(Some(*int != 0)),
        SqlValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(Some(true)),
            "false" | "f" | "0" => Ok(Some(false)),
            _ => Err(bind_error(text, "boolean")),
        },
        SqlValue::Float(float) => Ok(Some(*float != 0.0)),
        SqlValue::Null => Ok(None),
    }
}

fn to_datetime(value: &SqlValue) -> Result<Option<NaiveDateTime>> {
    let Some(text) = text_of(value) else {
        return Ok(None);
    };
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text.trim(), format) {
            return Ok(Some(parsed));
        }
    }
    Err(bind_error(&text, "timestamp"))
}

fn to_date(value: &SqlValue) -> Result<Option<NaiveDate>> {
    let Some(text) = text_of(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| bind_error(&text, "date"))
}

fn to_time(value: &SqlValue) -> Result<Option<NaiveTime>> {
    let Some(text) = text_of(value) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(text.trim(), "%H:%M:%S")
        .map(Some)
        .map_err(|_| bind_error(&text, "time"))
}

fn to_text(value: &SqlValue) -> Option<String> {
    match value {
        SqlValue::Text(text) => Some(text.clone()),
        SqlValue::Integer(int) => Some(int.to_string()),
        SqlValue::Float(float) => Some(float.to_string()),
        SqlValue::Bool(flag) => Some(flag.to_string()),
        SqlValue::Null => None,
    }
}

fn text_of(value: &SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        other => to_text(other),
    }
}

fn bind_error(raw: &str, expected: &str) -> Error {
    Error::invalid_input(format!("cannot bind `{raw}` as {expected}"))
}
