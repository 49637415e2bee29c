use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stratum_core::{
    Config, Dialect, Manager, SeedRunOptions, create_migration_scaffold, create_seed_scaffold,
};

#[derive(Parser)]
#[command(
    name = "stratum",
    version,
    about = "Declarative schema migrations for PostgreSQL, MySQL, and SQLite"
)]
struct Cli {
    /// JSON configuration file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "stratum.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scaffold a new migration file.
    #[command(name = "make:migration")]
    MakeMigration { name: String },

    /// Apply all pending migrations.
    Migrate {
        /// Run seeds after a successful apply.
        #[arg(long)]
        seed: bool,
        /// Row count override for --seed.
        #[arg(long)]
        rows: Option<usize>,
    },

    /// Roll back the last N applied migrations.
    #[command(name = "migration:rollback")]
    MigrationRollback {
        #[arg(long, default_value_t = 1)]
        step: usize,
    },

    /// Roll back everything and clear the history.
    #[command(name = "migration:reset")]
    MigrationReset,

    /// Report pending migrations without applying.
    #[command(name = "migration:validate")]
    MigrationValidate,

    /// Show applied and pending migration counts.
    Status,

    /// Scaffold a new seed file for a table.
    #[command(name = "make:seed")]
    MakeSeed { table: String },

    /// Run seed files.
    #[command(name = "db:seed")]
    DbSeed {
        /// Run only this seed file.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        rows: Option<usize>,
        /// Truncate each seeded table first.
        #[arg(long)]
        truncate: bool,
    },

    /// Print the applied-migration history.
    History {
        /// Only entries for this migration name.
        #[arg(long)]
        object: Option<String>,
    },

    /// Write a default configuration file.
    #[command(name = "config:init")]
    ConfigInit,

    /// Parse the configuration file and report problems.
    #[command(name = "config:validate")]
    ConfigValidate,

    /// Print the effective configuration.
    #[command(name = "config:show")]
    ConfigShow,

    /// Reset everything, then re-apply from zero.
    #[command(name = "db:reset")]
    DbReset,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::MakeMigration { name } => {
            let path = create_migration_scaffold(
                std::path::Path::new(&config.migration.directory),
                &name,
            )?;
            println!("created {}", path.display());
        }
        Command::MakeSeed { table } => {
            let path =
                create_seed_scaffold(std::path::Path::new(&config.seed.directory), &table)?;
            println!("created {}", path.display());
        }
        Command::ConfigInit => {
            if cli.config.exists() {
                bail!("configuration file `{}` already exists", cli.config.display());
            }
            std::fs::write(&cli.config, Config::default().to_pretty_json())
                .with_context(|| format!("writing {}", cli.config.display()))?;
            println!("created {}", cli.config.display());
        }
        Command::ConfigValidate => {
            Config::load(&cli.config)?;
            println!("{} is valid", cli.config.display());
        }
        Command::ConfigShow => {
            println!("{}", config.to_pretty_json());
            println!("dsn: {}", config.database.dsn());
        }
        Command::Migrate { seed, rows } => {
            let mut manager = connect(config)?;
            let summary = manager.apply_all()?;
            println!(
                "applied {} migration(s), skipped {}",
                summary.applied, summary.skipped
            );
            if seed {
                let options = SeedRunOptions {
                    rows,
                    ..SeedRunOptions::default()
                };
                let seeded = manager.run_seeds(&options)?;
                println!("seeded {} table(s), {} row(s)", seeded.seeds, seeded.rows);
            }
        }
        Command::MigrationRollback { step } => {
            let mut manager = connect(config)?;
            let rolled = manager.rollback(step)?;
            println!("rolled back {rolled} migration(s)");
        }
        Command::MigrationReset => {
            let mut manager = connect(config)?;
            let rolled = manager.reset()?;
            println!("reset {rolled} migration(s)");
        }
        Command::MigrationValidate => {
            let mut manager = connect(config)?;
            let report = manager.validate_pending()?;
            println!("{} migration(s) pending", report.pending.len());
            for name in &report.pending {
                println!("  {name}");
            }
        }
        Command::Status => {
            let mut manager = connect(config)?;
            let report = manager.validate_pending()?;
            println!(
                "applied: {}, pending: {}",
                report.applied,
                report.pending.len()
            );
        }
        Command::DbSeed {
            file,
            rows,
            truncate,
        } => {
            let mut manager = connect(config)?;
            let options = SeedRunOptions {
                file,
                rows,
                truncate,
            };
            let summary = manager.run_seeds(&options)?;
            println!("seeded {} table(s), {} row(s)", summary.seeds, summary.rows);
        }
        Command::History { object } => {
            let mut manager = connect(config)?;
            for entry in manager.history_entries()? {
                if let Some(wanted) = &object
                    && entry.name != *wanted
                {
                    continue;
                }
                println!(
                    "{}  {}  {}  {}",
                    entry.applied_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.name,
                    entry.version,
                    entry.checksum
                );
            }
        }
        Command::DbReset => {
            let mut manager = connect(config)?;
            let rolled = manager.reset()?;
            let summary = manager.apply_all()?;
            println!(
                "reset {rolled} migration(s), re-applied {}",
                summary.applied
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    let level = std::env::var("MIGRATE_LOG_LEVEL").ok().or_else(|| {
        std::env::var("MIGRATE_VERBOSE")
            .ok()
            .filter(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .map(|_| "debug".to_string())
    });

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::new("info"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    if path.exists() {
        return Ok(Config::load(path)?);
    }
    let mut config = Config::default();
    config.apply_env_overrides();
    Ok(config)
}

fn connect(config: Config) -> anyhow::Result<Manager> {
    let dialect = dialect_for(&config.database.driver)?;
    Ok(Manager::connect(config, dialect)?)
}

fn dialect_for(driver: &str) -> anyhow::Result<Arc<dyn Dialect>> {
    match driver {
        #[cfg(feature = "postgres")]
        "postgres" => Ok(Arc::new(stratum_dialect_postgres::PostgresDialect)),
        #[cfg(feature = "mysql")]
        "mysql" => Ok(Arc::new(stratum_dialect_mysql::MysqlDialect)),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(stratum_dialect_sqlite::SqliteDialect)),
        other => bail!(
            "unknown or disabled driver `{other}` (enabled: {})",
            enabled_dialects().join(", ")
        ),
    }
}

fn enabled_dialects() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "mysql")]
        "mysql",
        #[cfg(feature = "postgres")]
        "postgres",
        #[cfg(feature = "sqlite")]
        "sqlite",
    ]
}
