use std::{
    fs::{self, OpenOptions},
    io::{self, Write as _},
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use tracing::warn;

use crate::{Error, Result};

pub const LOCK_FILE_NAME: &str = "migration.lock";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cooperative single-writer lock for one workspace: an exclusive
/// create of `migration.lock`, deleted on release. Advisory only;
/// non-participating processes can still interfere.
#[derive(Debug)]
pub struct MigrationLock {
    path: PathBuf,
    released: bool,
}

impl MigrationLock {
    /// Acquires the lock, polling for up to `timeout_secs` seconds when
    /// another run holds it (0 fails immediately).
    pub fn acquire(workspace: &Path, timeout_secs: u64) -> Result<Self> {
        let path = workspace.join(LOCK_FILE_NAME);
        let deadline = Instant::now() + Duration::from_secs(timeout_secs);

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self {
                        path,
                        released: false,
                    });
                }
                Err(source) if source.kind() == io::ErrorKind::AlreadyExists => {
                    if timeout_secs == 0 || Instant::now() >= deadline {
                        return Err(Error::LockHeld { path });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => return Err(Error::io(&path, source)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|source| Error::io(&self.path, source))
    }
}

impl Drop for MigrationLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(source) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), %source, "failed to remove migration lock");
        }
    }
}
