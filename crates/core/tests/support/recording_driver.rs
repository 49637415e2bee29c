use std::{
    io,
    sync::{Arc, Mutex},
};

use stratum_core::{DatabaseDriver, Error, NamedArgs, Result, TransactionConfig};

/// Driver double that records every applied statement. A statement
/// containing the configured failure marker errors out, and probe
/// queries answer from `probe_result`.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    applied: Arc<Mutex<Vec<String>>>,
    bound_args: Arc<Mutex<Vec<NamedArgs>>>,
    fail_marker: Arc<Mutex<Option<String>>>,
    probe_result: Arc<Mutex<bool>>,
}

impl RecordingDriver {
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().expect("recorder poisoned").clone()
    }

    pub fn bound_args(&self) -> Vec<NamedArgs> {
        self.bound_args.lock().expect("recorder poisoned").clone()
    }

    pub fn fail_on(&self, marker: &str) {
        *self.fail_marker.lock().expect("recorder poisoned") = Some(marker.to_string());
    }

    pub fn set_probe_result(&self, exists: bool) {
        *self.probe_result.lock().expect("recorder poisoned") = exists;
    }
}

impl DatabaseDriver for RecordingDriver {
    fn name(&self) -> &str {
        "fake"
    }

    fn apply(
        &mut self,
        statements: &[String],
        named_args: Option<&NamedArgs>,
        _transaction: Option<&TransactionConfig>,
    ) -> Result<()> {
        let marker = self.fail_marker.lock().expect("recorder poisoned").clone();
        for statement in statements {
            if let Some(marker) = &marker
                && statement.contains(marker)
            {
                return Err(Error::db(
                    statement.clone(),
                    io::Error::other("injected failure"),
                ));
            }
        }
        self.applied
            .lock()
            .expect("recorder poisoned")
            .extend(statements.iter().cloned());
        if let Some(args) = named_args {
            self.bound_args
                .lock()
                .expect("recorder poisoned")
                .push(args.clone());
        }
        Ok(())
    }

    fn query_strings(&mut self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        if sql.starts_with("PROBE") {
            let exists = *self.probe_result.lock().expect("recorder poisoned");
            let value = if exists { "1" } else { "0" };
            return Ok(vec![vec![Some(value.to_string())]]);
        }
        Ok(Vec::new())
    }
}
