use rusqlite::{Connection, params_from_iter, types::Value};
use stratum_core::{
    DatabaseConfig, DatabaseDriver, Error, NamedArgs, Result, SqlValue, TransactionConfig,
    bind_positional, split_statements,
};

const CONNECT_SQL: &str = "CONNECT sqlite";

pub(crate) struct SqliteDriver {
    connection: Connection,
}

pub(crate) fn connect(config: &DatabaseConfig) -> Result<Box<dyn DatabaseDriver>> {
    let connection = Connection::open(config.database.as_str())
        .map_err(|source| Error::db(CONNECT_SQL, source))?;
    Ok(Box::new(SqliteDriver { connection }))
}

impl DatabaseDriver for SqliteDriver {
    fn name(&self) -> &str {
        crate::DIALECT_NAME
    }

    /// SQLite has no isolation levels; `transaction` settings are
    /// accepted and ignored.
    fn apply(
        &mut self,
        statements: &[String],
        named_args: Option<&NamedArgs>,
        _transaction: Option<&TransactionConfig>,
    ) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .map_err(|source| Error::db("BEGIN", source))?;

        let mut pending_args = named_args;
        for statement in statements {
            for piece in split_statements(statement) {
                if let Some(args) = pending_args.take() {
                    let (sql, values) = bind_positional(&piece, args, |_| "?".to_string())?;
                    tx.execute(&sql, params_from_iter(values.iter().map(to_sqlite_value)))
                        .map_err(|source| Error::db(sql.clone(), source))?;
                } else {
                    tx.execute_batch(&piece)
                        .map_err(|source| Error::db(piece.clone(), source))?;
                }
            }
        }

        tx.commit().map_err(|source| Error::db("COMMIT", source))
    }

    fn query_strings(&mut self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(|source| Error::db(sql, source))?;
        let column_count = statement.column_count();
        let mut rows = statement
            .query([])
            .map_err(|source| Error::db(sql, source))?;

        let mut output = Vec::new();
        while let Some(row) = rows.next().map_err(|source| Error::db(sql, source))? {
            let mut columns = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value = row
                    .get_ref(index)
                    .map_err(|source| Error::db(sql, source))?;
                columns.push(ref_to_string(value));
            }
            output.push(columns);
        }
        Ok(output)
    }
}

fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Text(text) => Value::Text(text.clone()),
        SqlValue::Integer(int) => Value::Integer(*int),
        SqlValue::Float(float) => Value::Real(*float),
        SqlValue::Bool(flag) => Value::Integer(i64::from(*flag)),
        SqlValue::Null => Value::Null,
    }
}

fn ref_to_string(value: rusqlite::types::ValueRef<'_>) -> Option<String> {
    match value {
        rusqlite::types::ValueRef::Null => None,
        rusqlite::types::ValueRef::Integer(int) => Some(int.to_string()),
        rusqlite::types::ValueRef::Real(real) => Some(real.to_string()),
        rusqlite::types::ValueRef::Text(text) => Some(String::from_utf8_lossy(text).into_owned()),
        rusqlite::types::ValueRef::Blob(blob) => Some(String::from_utf8_lossy(blob).into_owned()),
    }
}
