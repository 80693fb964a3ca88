use mylite_common::config::RetrySettings;
use mylite_error::{ErrorCode, MyliteError};
use mylite_schema::DdlEngine;
use std::collections::HashMap;

/// Engine double that records every call and fails on cue.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub log: Vec<String>,
    /// Statement text -> error returned when it executes.
    pub failures: HashMap<String, MyliteError>,
    /// Number of upcoming COMMIT calls that report busy.
    pub busy_commits: u32,
    /// Number of upcoming BEGIN calls that report locked.
    pub busy_begins: u32,
    in_transaction: bool,
}

#[allow(dead_code)]
impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, statement: &str, error: MyliteError) -> Self {
        self.failures.insert(statement.to_string(), error);
        self
    }

    pub fn with_busy_commits(mut self, n: u32) -> Self {
        self.busy_commits = n;
        self
    }

    pub fn with_busy_begins(mut self, n: u32) -> Self {
        self.busy_begins = n;
        self
    }

    pub fn executed(&self) -> Vec<&str> {
        self.log
            .iter()
            .map(String::as_str)
            .filter(|s| !matches!(*s, "BEGIN" | "COMMIT" | "ROLLBACK" | "COMMIT (busy)" | "BEGIN (busy)"))
            .collect()
    }
}

impl DdlEngine for ScriptedEngine {
    fn begin(&mut self) -> Result<(), MyliteError> {
        if self.busy_begins > 0 {
            self.busy_begins -= 1;
            self.log.push("BEGIN (busy)".to_string());
            return Err(busy("database is locked"));
        }
        self.log.push("BEGIN".to_string());
        self.in_transaction = true;
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> Result<(), MyliteError> {
        self.log.push(statement.to_string());
        match self.failures.get(statement) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn commit(&mut self) -> Result<(), MyliteError> {
        if self.busy_commits > 0 {
            self.busy_commits -= 1;
            self.log.push("COMMIT (busy)".to_string());
            return Err(busy("database is busy"));
        }
        self.log.push("COMMIT".to_string());
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), MyliteError> {
        if self.in_transaction {
            self.log.push("ROLLBACK".to_string());
            self.in_transaction = false;
        }
        Ok(())
    }
}

pub fn busy(message: &str) -> MyliteError {
    MyliteError::new(ErrorCode::EngineBusy, message)
}

pub fn fatal(message: &str) -> MyliteError {
    MyliteError::new(ErrorCode::EngineFailure, message)
}

pub fn fast_retry(max_attempts: u32) -> RetrySettings {
    RetrySettings {
        max_attempts,
        base_delay_ms: 0,
        max_delay_ms: 0,
    }
}
