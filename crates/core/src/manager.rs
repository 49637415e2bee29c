use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError},
};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    Config, DatabaseDriver, DbHistoryStore, Dialect, Direction, Error, FileHistoryStore,
    HistoryEntry, HistoryStore, HistoryStoreKind, Migration, MigrationLock, Result, SchemaCache,
    SeedEngine,
    bcl::{parse_migration_source, parse_seed_source},
    checksum::sha256_hex,
    driver::{SharedDriver, is_truthy, shared_driver},
    scaffold,
    seed::{Seed, SeedCondition},
    validate::validate_migration,
};

/// The migration lifecycle controller: applies, rolls back, resets, and
/// validates migrations against one database connection, guarded by the
/// workspace lock, and runs seeds through the same connection.
pub struct Manager {
    config: Config,
    dialect: Arc<dyn Dialect>,
    driver: SharedDriver,
    history: Box<dyn HistoryStore>,
    cache: SchemaCache,
    workspace: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingReport {
    pub applied: usize,
    pub pending: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SeedRunOptions {
    /// Run only this seed file instead of the whole seed directory.
    pub file: Option<PathBuf>,
    pub rows: Option<usize>,
    pub truncate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub seeds: usize,
    pub rows: usize,
}

impl Manager {
    /// Connects through the dialect and anchors lock and file paths at
    /// the current directory.
    pub fn connect(config: Config, dialect: Arc<dyn Dialect>) -> Result<Self> {
        let driver = dialect.connect(&config.database)?;
        Ok(Self::with_driver(config, dialect, shared_driver(driver), "."))
    }

    pub fn with_driver(
        config: Config,
        dialect: Arc<dyn Dialect>,
        driver: SharedDriver,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        let workspace = workspace.into();
        let history: Box<dyn HistoryStore> = match config.migration.history_store {
            HistoryStoreKind::File => Box::new(FileHistoryStore::new(join_workspace(
                &workspace,
                &config.migration.history_file,
            ))),
            HistoryStoreKind::Database => Box::new(DbHistoryStore::new(
                driver.clone(),
                dialect.clone(),
                config.migration.table_name.clone(),
            )),
        };
        Self::with_history(config, dialect, driver, history, workspace)
    }

    pub fn with_history(
        config: Config,
        dialect: Arc<dyn Dialect>,
        driver: SharedDriver,
        history: Box<dyn HistoryStore>,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            dialect,
            driver,
            history,
            cache: SchemaCache::default(),
            workspace: workspace.into(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Applies every pending migration in filename order. The history
    /// entry for each migration is written only after its transaction
    /// commits, so a mid-list failure leaves earlier migrations applied.
    pub fn apply_all(&mut self) -> Result<ApplySummary> {
        self.history.validate_storage()?;
        let _lock =
            MigrationLock::acquire(&self.workspace, self.config.migration.lock_timeout)?;
        self.apply_all_locked()
    }

    fn apply_all_locked(&mut self) -> Result<ApplySummary> {
        let applied: HashMap<String, String> = self
            .history
            .load()?
            .into_iter()
            .map(|entry| (entry.name, entry.checksum))
            .collect();
        let mut summary = ApplySummary::default();

        for path in self.migration_files()? {
            let (migration, checksum) = self.load_migration(&path)?;

            if migration.disable {
                warn!(migration = %migration.name, "skipping disabled migration");
                summary.skipped += 1;
                continue;
            }

            if let Some(recorded) = applied.get(&migration.name) {
                if *recorded == checksum {
                    debug!(migration = %migration.name, "already applied, checksum unchanged");
                    summary.skipped += 1;
                    continue;
                }
                return Err(Error::Drift {
                    migration: migration.name,
                    recorded: recorded.clone(),
                    actual: checksum,
                });
            }

            if self.config.migration.batch_size > 0
                && summary.applied >= self.config.migration.batch_size
            {
                info!(
                    batch_size = self.config.migration.batch_size,
                    "migration batch size reached, leaving the rest pending"
                );
                break;
            }

            self.apply_one(&migration, &checksum)
                .map_err(|source| Error::migration_failed(&migration.name, source))?;
            summary.applied += 1;
        }

        Ok(summary)
    }

    fn apply_one(&mut self, migration: &Migration, checksum: &str) -> Result<()> {
        if let Some(declared) = &migration.driver
            && declared != self.dialect.name()
        {
            warn!(
                migration = %migration.name,
                declared = %declared,
                active = %self.dialect.name(),
                "migration declares a different driver; applying with the active connection"
            );
        }

        if !self.config.migration.skip_validation {
            validate_migration(migration, &self.config.validation)?;
        }

        let statements = migration.to_sql(self.dialect.as_ref(), Direction::Up, &self.cache)?;

        if self.config.migration.dry_run {
            let rendered = self
                .dialect
                .wrap_in_transaction(statements, migration.transaction_config())
                .join("\n");
            info!(migration = %migration.name, "dry run:\n{rendered}");
            return Ok(());
        }

        self.run_checks(migration, |hooks| &hooks.pre_up_checks)?;

        let applied = self.with_connection(|driver| {
            driver.apply(&statements, None, migration.transaction_config())
        });
        if let Err(source) = applied {
            if self.config.migration.auto_rollback {
                self.auto_rollback(migration);
            }
            return Err(source);
        }

        self.run_checks(migration, |hooks| &hooks.post_up_checks)?;

        self.history.save(&HistoryEntry {
            name: migration.name.clone(),
            version: migration.version.clone(),
            description: migration.description.clone(),
            checksum: checksum.to_string(),
            applied_at: Utc::now(),
        })?;
        info!(migration = %migration.name, "applied");
        Ok(())
    }

    /// Placeholder check semantics: a hook label containing `fail`
    /// (case-insensitive) fails, anything else passes.
    fn run_checks(
        &self,
        migration: &Migration,
        select: impl Fn(&crate::ValidationHooks) -> &Vec<String>,
    ) -> Result<()> {
        for hooks in &migration.validate {
            for check in select(hooks) {
                if check.to_ascii_lowercase().contains("fail") {
                    return Err(Error::invalid_input(format!(
                        "validation check `{check}` failed"
                    )));
                }
                debug!(migration = %migration.name, %check, "validation check passed");
            }
        }
        Ok(())
    }

    /// `auto_rollback` policy: attempt the failing migration's down
    /// operations, log the outcome, and surface the original error.
    fn auto_rollback(&self, migration: &Migration) {
        info!(migration = %migration.name, "auto_rollback: running down operations");
        match migration.to_sql(self.dialect.as_ref(), Direction::Down, &self.cache) {
            Ok(statements) if statements.is_empty() => {
                debug!(migration = %migration.name, "auto_rollback: no down operations");
            }
            Ok(statements) => {
                if let Err(source) = self.with_connection(|driver| {
                    driver.apply(&statements, None, migration.transaction_config())
                }) {
                    warn!(migration = %migration.name, %source, "auto_rollback failed");
                }
            }
            Err(source) => {
                warn!(migration = %migration.name, %source, "auto_rollback could not generate down SQL");
            }
        }
    }

    /// Rolls back the last `min(step, applied)` migrations, newest
    /// first. `step` must be at least 1; a history entry without a
    /// matching migration file is fatal.
    pub fn rollback(&mut self, step: usize) -> Result<usize> {
        if step == 0 {
            return Err(Error::invalid_input("rollback step must be at least 1"));
        }
        self.history.validate_storage()?;
        let _lock =
            MigrationLock::acquire(&self.workspace, self.config.migration.lock_timeout)?;
        self.rollback_locked(step)
    }

    fn rollback_locked(&mut self, step: usize) -> Result<usize> {
        let entries = self.history.load()?;
        if entries.is_empty() {
            info!("no applied migrations to roll back");
            return Ok(0);
        }

        let count = step.min(entries.len());
        let tail = entries[entries.len() - count..].to_vec();
        let migrations = self.migrations_by_name()?;

        for entry in tail.iter().rev() {
            let migration = migrations.get(&entry.name).ok_or_else(|| {
                Error::invalid_input(format!(
                    "no migration file found for applied migration `{}`",
                    entry.name
                ))
            })?;
            let statements =
                migration.to_sql(self.dialect.as_ref(), Direction::Down, &self.cache)?;
            if !statements.is_empty() {
                self.with_connection(|driver| {
                    driver.apply(&statements, None, migration.transaction_config())
                })
                .map_err(|source| Error::migration_failed(&entry.name, source))?;
            }
            info!(migration = %entry.name, "rolled back");
        }

        self.history.rollback(&tail)?;
        Ok(count)
    }

    /// Rolls back everything and truncates history; the next apply
    /// starts from zero. Also drops the cached table schemas.
    pub fn reset(&mut self) -> Result<usize> {
        self.history.validate_storage()?;
        let _lock =
            MigrationLock::acquire(&self.workspace, self.config.migration.lock_timeout)?;
        let total = self.history.load()?.len();
        let rolled = if total > 0 {
            self.rollback_locked(total)?
        } else {
            0
        };
        self.cache.clear();
        info!(rolled, "migration state reset");
        Ok(rolled)
    }

    /// Read-only: which migration files have not been applied yet.
    pub fn validate_pending(&mut self) -> Result<PendingReport> {
        self.history.validate_storage()?;
        let applied: HashSet<String> = self
            .history
            .load()?
            .into_iter()
            .map(|entry| entry.name)
            .collect();

        let mut pending = Vec::new();
        for path in self.migration_files()? {
            let (migration, _) = self.load_migration(&path)?;
            if !applied.contains(&migration.name) && !migration.disable {
                pending.push(migration.name);
            }
        }

        Ok(PendingReport {
            applied: applied.len(),
            pending,
        })
    }

    pub fn validate_storage(&mut self) -> Result<()> {
        self.history.validate_storage()
    }

    pub fn history_entries(&mut self) -> Result<Vec<HistoryEntry>> {
        self.history.validate_storage()?;
        self.history.load()
    }

    pub fn create_migration_scaffold(&self, name: &str) -> Result<PathBuf> {
        scaffold::create_migration_scaffold(&self.migration_dir(), name)
    }

    pub fn create_seed_scaffold(&self, table: &str) -> Result<PathBuf> {
        scaffold::create_seed_scaffold(&self.seed_dir(), table)
    }

    /// Runs seed files: optional truncation, condition probes, then one
    /// parameterised insert per generated row.
    pub fn run_seeds(&mut self, options: &SeedRunOptions) -> Result<SeedSummary> {
        let files = match &options.file {
            Some(file) => vec![join_workspace(&self.workspace, &file.display().to_string())],
            None => self.seed_files()?,
        };

        let mut summary = SeedSummary::default();
        let dialect = self.dialect.clone();
        let mut engine = SeedEngine::new(dialect.as_ref());

        for path in files {
            let seed = self.load_seed(&path)?;

            if let Some(condition) = seed.condition {
                let exists = self.table_exists(&seed.table)?;
                let skip = match condition {
                    SeedCondition::IfExists => !exists,
                    SeedCondition::IfNotExists => exists,
                };
                if skip {
                    info!(seed = %seed.name, table = %seed.table, "condition not met, skipping");
                    continue;
                }
            }

            if options.truncate || self.config.seed.truncate_first {
                let truncate = self.dialect.truncate_table(&seed.table);
                self.with_connection(|driver| driver.apply(&[truncate], None, None))?;
            }

            let rows = options.rows.unwrap_or(if seed.rows > 0 {
                seed.rows
            } else {
                self.config.seed.default_rows
            });

            let inserts = engine.generate_rows(&seed, rows)?;
            let progress_every = self.config.seed.batch_size.max(1);
            for (index, insert) in inserts.iter().enumerate() {
                self.with_connection(|driver| {
                    driver.apply(
                        std::slice::from_ref(&insert.sql),
                        Some(&insert.args),
                        None,
                    )
                })?;
                if (index + 1) % progress_every == 0 {
                    debug!(seed = %seed.name, inserted = index + 1, "seed progress");
                }
            }

            summary.seeds += 1;
            summary.rows += inserts.len();
            info!(seed = %seed.name, rows = inserts.len(), "seeded");
        }

        Ok(summary)
    }

    fn migration_dir(&self) -> PathBuf {
        join_workspace(&self.workspace, &self.config.migration.directory)
    }

    fn seed_dir(&self) -> PathBuf {
        join_workspace(&self.workspace, &self.config.seed.directory)
    }

    fn migration_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.migration_dir();
        let seed_dir = self.seed_dir();
        let mut files = Vec::new();
        if dir.is_dir() {
            collect_bcl_files(&dir, &seed_dir, &mut files)?;
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn seed_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.seed_dir();
        let mut files = Vec::new();
        if dir.is_dir() {
            collect_bcl_files(&dir, Path::new(""), &mut files)?;
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn load_migration(&self, path: &Path) -> Result<(Migration, String)> {
        let bytes = fs::read(path).map_err(|source| Error::io(path, source))?;
        let checksum = sha256_hex(&bytes);
        let source = String::from_utf8(bytes).map_err(|_| {
            Error::invalid_input(format!("migration file `{}` is not UTF-8", path.display()))
        })?;
        let migration = parse_migration_source(&source, &path.display().to_string())?;
        Ok((migration, checksum))
    }

    fn load_seed(&self, path: &Path) -> Result<Seed> {
        let source =
            fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        parse_seed_source(&source, &path.display().to_string())
    }

    fn migrations_by_name(&self) -> Result<HashMap<String, Migration>> {
        let mut migrations = HashMap::new();
        for path in self.migration_files()? {
            let (migration, _) = self.load_migration(&path)?;
            migrations.insert(migration.name.clone(), migration);
        }
        Ok(migrations)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let probe = self.dialect.table_exists_probe(table);
        let rows = self.with_connection(|driver| driver.query_strings(&probe))?;
        Ok(rows
            .first()
            .and_then(|row| row.first())
            .is_some_and(|value| is_truthy(value.as_deref())))
    }

    fn with_connection<T>(
        &self,
        run: impl FnOnce(&mut dyn DatabaseDriver) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        run(guard.as_mut())
    }
}

fn join_workspace(workspace: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

fn collect_bcl_files(dir: &Path, excluded: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| Error::io(dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::io(dir, source))?;
        let path = entry.path();
        if path.is_dir() {
            if !excluded.as_os_str().is_empty() && path == excluded {
                continue;
            }
            collect_bcl_files(&path, excluded, out)?;
        } else if path.extension().is_some_and(|ext| ext == "bcl") {
            out.push(path);
        }
    }
    Ok(())
}
