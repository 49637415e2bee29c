use std::{error::Error as StdError, io, path::PathBuf};

use thiserror::Error;

type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation `{operation}` on `{target}` is not supported by dialect `{dialect}`: {detail}")]
    Unsupported {
        dialect: String,
        operation: String,
        target: String,
        detail: String,
    },

    #[error(
        "migration `{migration}` has been modified after being applied (checksum mismatch: recorded {recorded}, found {actual})"
    )]
    Drift {
        migration: String,
        recorded: String,
        actual: String,
    },

    #[error("io failure on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("database failure while executing `{statement}`")]
    Db {
        statement: String,
        #[source]
        source: BoxedError,
    },

    #[error("parse failure in `{file}` at {line}:{column}: {message}")]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("migration lock already acquired (lockfile `{}` exists)", path.display())]
    LockHeld { path: PathBuf },

    #[error("seed `{seed}` could not resolve expr fields: {fields:?}")]
    ExprResolution { seed: String, fields: Vec<String> },

    #[error("migration `{migration}` failed")]
    MigrationFailed {
        migration: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn invalid_input(context: impl Into<String>) -> Self {
        Self::InvalidInput(context.into())
    }

    pub fn unsupported(
        dialect: impl Into<String>,
        operation: impl Into<String>,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Unsupported {
            dialect: dialect.into(),
            operation: operation.into(),
            target: target.into(),
            detail: detail.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn db<E>(statement: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Db {
            statement: statement.into(),
            source: Box::new(source),
        }
    }

    pub fn migration_failed(migration: impl Into<String>, source: Error) -> Self {
        Self::MigrationFailed {
            migration: migration.into(),
            source: Box::new(source),
        }
    }

    pub fn parse(
        file: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
