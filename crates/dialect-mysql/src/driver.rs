use mysql::{OptsBuilder, Pool, PooledConn, Value, prelude::Queryable};
use stratum_core::{
    DatabaseConfig, DatabaseDriver, Error, NamedArgs, Result, SqlValue, TransactionConfig,
    bind_positional, split_statements,
};

const CONNECT_SQL: &str = "CONNECT mysql";

/// Server error codes tolerated inside rollback-style batches: unknown
/// table (1051), unknown column (1054), and the cyclic foreign-key
/// failures (1217, 1451).
const IGNORABLE_ROLLBACK_CODES: &[u16] = &[1051, 1054, 1217, 1451];
const IGNORABLE_ROLLBACK_SUBSTRINGS: &[&str] = &["doesn't exist", "unknown table", "unknown column"];

pub(crate) struct MysqlDriver {
    connection: PooledConn,
}

pub(crate) fn connect(config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>> {
    let mut opts = OptsBuilder::new()
        .ip_or_hostname(Some(config.host.clone()))
        .tcp_port(config.effective_port())
        .db_name(Some(config.database.clone()));
    if !config.username.is_empty() {
        opts = opts.user(Some(config.username.clone()));
    }
    if !config.password.is_empty() {
        opts = opts.pass(Some(config.password.clone()));
    }
    if config.timeout > 0 {
        opts = opts.tcp_connect_timeout(Some(std::time::Duration::from_secs(config.timeout)));
    }

    let pool = Pool::new(opts).map_err(|source| Error::db(CONNECT_SQL, source))?;
    let connection = pool
        .get_conn()
        .map_err(|source| Error::db(CONNECT_SQL, source))?;
    Ok(Box::new(MysqlDriver { connection }))
}

impl DatabaseDriver for MysqlDriver {
    fn name(&self) -> &str {
        crate::DIALECT_NAME
    }

    fn apply(
        &mut self,
        statements: &[String],
        named_args: Option<&NamedArgs>,
        transaction: Option<&TransactionConfig>,
    ) -> Result<()> {
        // Rollback-style batches disable FK checks and tolerate
        // missing-object errors; everything else fails the batch.
        let rollback_batch = is_rollback_batch(statements);

        if let Some(level) = transaction.and_then(|config| config.isolation_level.as_deref()) {
            let set_level = format!("SET TRANSACTION ISOLATION LEVEL {}", level.to_uppercase());
            self.connection
                .query_drop(&set_level)
                .map_err(|source| Error::db(set_level.clone(), source))?;
        }

        let mut tx = self
            .connection
            .start_transaction(mysql::TxOpts::default())
            .map_err(|source| Error::db("START TRANSACTION", source))?;

        if rollback_batch {
            tx.query_drop("SET FOREIGN_KEY_CHECKS=0")
                .map_err(|source| Error::db("SET FOREIGN_KEY_CHECKS=0", source))?;
        }

        let mut pending_args = named_args;
        for statement in statements {
            for piece in split_statements(statement) {
                let outcome = if let Some(args) = pending_args.take() {
                    let (sql, values) = bind_positional(&piece, args, |_| "?".to_string())?;
                    tx.exec_drop(
                        &sql,
                        mysql::Params::Positional(
                            values.iter().map(to_mysql_value).collect(),
                        ),
                    )
                } else {
                    tx.query_drop(&piece)
                };

                if let Err(source) = outcome {
                    if rollback_batch && is_ignorable_rollback_error(&source) {
                        continue;
                    }
                    return Err(Error::db(piece, source));
                }
            }
        }

        if rollback_batch {
            tx.query_drop("SET FOREIGN_KEY_CHECKS=1")
                .map_err(|source| Error::db("SET FOREIGN_KEY_CHECKS=1", source))?;
        }

        tx.commit().map_err(|source| Error::db("COMMIT", source))
    }

    fn query_strings(&mut self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        let rows: Vec<mysql::Row> = self
            .connection
            .query(sql)
            .map_err(|source| Error::db(sql, source))?;

        Ok(rows
            .into_iter()
            .map(|row| row.unwrap().iter().map(value_to_string).collect())
            .collect())
    }
}

/// A batch that drops tables, views, or functions is treated as a
/// rollback: FK checks are disabled and missing-object errors are
/// tolerated.
pub fn is_rollback_batch(statements: &[String]) -> bool {
    statements.iter().any(|statement| {
        let upper = statement.to_uppercase();
        upper.contains("DROP TABLE") || upper.contains("DROP VIEW") || upper.contains("DROP FUNCTION")
    })
}

pub fn is_ignorable_rollback_error(error: &mysql::Error) -> bool {
    if let mysql::Error::MySqlError(server_error) = error {
        if IGNORABLE_ROLLBACK_CODES.contains(&server_error.code) {
            return true;
        }
        let message = server_error.message.to_lowercase();
        return IGNORABLE_ROLLBACK_SUBSTRINGS
            .iter()
            .any(|needle| message.contains(needle));
    }
    false
}

fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Text(text) => Value::Bytes(text.clone().into_bytes()),
        SqlValue::Integer(int) => Value::Int(*int),
        SqlValue::Float(float) => Value::Double(*float),
        SqlValue::Bool(flag) => Value::Int(i64::from(*flag)),
        SqlValue::Null => Value::NULL,
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::Int(int) => Some(int.to_string()),
        Value::UInt(uint) => Some(uint.to_string()),
        Value::Float(float) => Some(float.to_string()),
        Value::Double(double) => Some(double.to_string()),
        Value::Date(year, month, day, hour, minute, second, _micros) => Some(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
        )),
        Value::Time(negative, days, hours, minutes, seconds, _micros) => {
            let sign = if *negative { "-" } else { "" };
            Some(format!(
                "{sign}{:02}:{minutes:02}:{seconds:02}",
                u32::from(*hours) + u32::from(*days) * 24
            ))
        }
    }
}
