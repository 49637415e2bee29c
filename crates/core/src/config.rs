use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub migration: MigrationConfig,
    pub seed: SeedConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    pub charset: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub directory: String,
    pub table_name: String,
    pub lock_timeout: u64,
    pub batch_size: usize,
    pub auto_rollback: bool,
    pub dry_run: bool,
    pub skip_validation: bool,
    pub history_store: HistoryStoreKind,
    pub history_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub directory: String,
    pub default_rows: usize,
    pub truncate_first: bool,
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enabled: bool,
    pub strict_mode: bool,
    pub allowed_data_types: Vec<String>,
    pub forbidden_names: Vec<String>,
    pub max_identifier_length: usize,
    pub require_description: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStoreKind {
    File,
    #[default]
    Database,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            username: String::new(),
            password: String::new(),
            database: "stratum.db".to_string(),
            ssl_mode: "disable".to_string(),
            charset: "utf8mb4".to_string(),
            timeout: 0,
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            directory: "migrations".to_string(),
            table_name: "migrations".to_string(),
            lock_timeout: 0,
            batch_size: 0,
            auto_rollback: false,
            dry_run: false,
            skip_validation: false,
            history_store: HistoryStoreKind::Database,
            history_file: "migration_history.json".to_string(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            directory: "migrations/seeds".to_string(),
            default_rows: 10,
            truncate_first: false,
            batch_size: 1,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_mode: false,
            allowed_data_types: Vec::new(),
            forbidden_names: Vec::new(),
            max_identifier_length: crate::ident::MAX_IDENTIFIER_LENGTH,
            require_description: false,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        let mut config = Self::from_json(&raw, &path.display().to_string())?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_json(raw: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|source| {
            Error::parse(
                origin,
                source.line(),
                source.column(),
                source.to_string(),
            )
        })
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// `MIGRATE_*` environment variables override file-provided values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("MIGRATE_DB_HOST") {
            self.database.host = value;
        }
        if let Ok(value) = env::var("MIGRATE_DB_PORT")
            && let Ok(port) = value.parse()
        {
            self.database.port = port;
        }
        if let Ok(value) = env::var("MIGRATE_DB_USERNAME") {
            self.database.username = value;
        }
        if let Ok(value) = env::var("MIGRATE_DB_PASSWORD") {
            self.database.password = value;
        }
        if let Ok(value) = env::var("MIGRATE_DB_DATABASE") {
            self.database.database = value;
        }
        if let Ok(value) = env::var("MIGRATE_DB_DRIVER") {
            self.database.driver = value;
        }
        if let Ok(value) = env::var("MIGRATE_MIGRATION_DIR") {
            self.migration.directory = value;
        }
        if let Ok(value) = env::var("MIGRATE_SEED_DIR") {
            self.seed.directory = value;
        }
    }
}

impl DatabaseConfig {
    /// Effective port, falling back to the driver's conventional default.
    pub fn effective_port(&self) -> u16 {
        if self.port != 0 {
            return self.port;
        }
        match self.driver.as_str() {
            "postgres" => 5432,
            "mysql" => 3306,
            _ => 0,
        }
    }

    /// Connection string in the engine's documented per-driver shape.
    /// Drivers connect from the typed fields; this rendering backs
    /// `config:show` and log output.
    pub fn dsn(&self) -> String {
        match self.driver.as_str() {
            "postgres" => format!(
                "host={} port={} user={} dbname={} password={} sslmode={}",
                self.host,
                self.effective_port(),
                self.username,
                self.database,
                self.password,
                self.ssl_mode
            ),
            "mysql" => format!(
                "{}:{}@tcp({}:{})/{}?charset={}",
                self.username,
                self.password,
                self.host,
                self.effective_port(),
                self.database,
                self.charset
            ),
            _ => self.database.clone(),
        }
    }
}
