//! Schema Installer
//!
//! Applies a MySQL-dialect DDL batch in two transactions: every table
//! statement commits before any index statement runs. Duplicate index
//! names within a run are renamed before execution, and busy/locked
//! contention at the transaction boundaries is retried a bounded number of
//! times. Anything else aborts the whole run.

use crate::batch::split_statements;
use crate::engine::DdlEngine;
use crate::error::InstallError;
use crate::index_names::{is_index_statement, IndexNameRegistry};
use crate::rewriter::{QueryRewriter, Rewritten};
use mylite_common::config::RetrySettings;
use mylite_common::retry::{retry_blocking, RetryError};
use mylite_common::scrubber::scrub;
use mylite_error::{InstallPhase, MyliteError};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotStarted,
    TablesApplied,
    IndexesApplied,
    Done,
    Failed,
}

impl InstallState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallState::Done | InstallState::Failed)
    }
}

/// Rewritten statements of one batch, split by phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub tables: Vec<String>,
    pub indexes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub tables_executed: usize,
    pub indexes_executed: usize,
    /// `(original, replacement)` for every index renamed on collision.
    pub renamed: Vec<(String, String)>,
    /// Retries spent on busy/locked BEGIN and COMMIT, over both phases.
    pub commit_retries: u32,
}

pub struct SchemaInstaller<R> {
    rewriter: R,
    retry: RetrySettings,
    state: InstallState,
}

impl<R: QueryRewriter> SchemaInstaller<R> {
    pub fn new(rewriter: R, retry: RetrySettings) -> Self {
        Self {
            rewriter,
            retry,
            state: InstallState::NotStarted,
        }
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Split and rewrite `batch` without touching the engine.
    ///
    /// Standalone `CREATE INDEX` statements join the index phase so they
    /// never run before a table of the same batch.
    pub fn plan(&self, batch: &str) -> Result<InstallPlan, InstallError> {
        let statements = split_statements(batch);
        if statements.is_empty() {
            return Err(InstallError::EmptyBatch);
        }

        let mut plan = InstallPlan::default();
        for statement in statements {
            match self.rewriter.rewrite(&statement) {
                Ok(Rewritten::Single(sql)) if is_index_statement(&sql) => plan.indexes.push(sql),
                Ok(Rewritten::Single(sql)) => plan.tables.push(sql),
                Ok(Rewritten::Table { table, indexes }) => {
                    plan.tables.push(table);
                    plan.indexes.extend(indexes);
                }
                Err(source) => return Err(InstallError::Rewrite { statement, source }),
            }
        }
        Ok(plan)
    }

    #[instrument(skip_all, fields(batch_len = batch.len()))]
    pub fn install<E: DdlEngine>(
        &mut self,
        engine: &mut E,
        batch: &str,
    ) -> Result<InstallReport, MyliteError> {
        self.state = InstallState::NotStarted;
        match self.run(engine, batch) {
            Ok(report) => {
                self.state = InstallState::Done;
                info!(
                    tables = report.tables_executed,
                    indexes = report.indexes_executed,
                    renamed = report.renamed.len(),
                    "Schema installed"
                );
                Ok(report)
            }
            Err(e) => {
                self.state = InstallState::Failed;
                let err = e.to_mylite_error();
                error!(code = %err.code, "Schema installation failed: {}", err.message);
                Err(err)
            }
        }
    }

    fn run<E: DdlEngine>(
        &mut self,
        engine: &mut E,
        batch: &str,
    ) -> Result<InstallReport, InstallError> {
        let plan = self.plan(batch)?;
        let mut report = InstallReport::default();

        if !plan.tables.is_empty() {
            report.commit_retries += self.apply_phase(engine, InstallPhase::Tables, &plan.tables)?;
        }
        report.tables_executed = plan.tables.len();
        self.state = InstallState::TablesApplied;

        let mut names = IndexNameRegistry::new();
        let indexes: Vec<String> = plan
            .indexes
            .iter()
            .map(|statement| {
                let (sql, renamed) = names.claim(statement);
                if let Some((original, replacement)) = renamed {
                    warn!(%original, %replacement, "Index name already used in this run, renaming");
                    report.renamed.push((original, replacement));
                }
                sql
            })
            .collect();

        if !indexes.is_empty() {
            report.commit_retries += self.apply_phase(engine, InstallPhase::Indexes, &indexes)?;
        }
        report.indexes_executed = indexes.len();
        self.state = InstallState::IndexesApplied;

        Ok(report)
    }

    /// Run `statements` in one transaction, returning the retries spent.
    fn apply_phase<E: DdlEngine>(
        &self,
        engine: &mut E,
        phase: InstallPhase,
        statements: &[String],
    ) -> Result<u32, InstallError> {
        let ((), begin_retries) = retry_blocking(
            "begin",
            self.retry,
            MyliteError::is_contention,
            || engine.begin(),
        )
        .map_err(|e| retry_failure(phase, "BEGIN", e))?;

        for statement in statements {
            debug!(%phase, statement = %scrub(statement), "Executing DDL");
            if let Err(source) = engine.execute(statement) {
                error!(%phase, statement = %scrub(statement), "DDL statement failed: {}", source);
                rollback(engine, phase);
                return Err(InstallError::Statement {
                    phase,
                    statement: statement.clone(),
                    source,
                });
            }
        }

        match retry_blocking(
            "commit",
            self.retry,
            MyliteError::is_contention,
            || engine.commit(),
        ) {
            Ok(((), commit_retries)) => Ok(begin_retries + commit_retries),
            Err(e) => {
                rollback(engine, phase);
                Err(retry_failure(phase, "COMMIT", e))
            }
        }
    }
}

fn retry_failure(phase: InstallPhase, statement: &str, e: RetryError<MyliteError>) -> InstallError {
    if e.exhausted {
        InstallError::Contention {
            phase,
            attempts: e.attempts,
            statement: statement.to_string(),
        }
    } else {
        InstallError::Statement {
            phase,
            statement: statement.to_string(),
            source: e.error,
        }
    }
}

fn rollback<E: DdlEngine>(engine: &mut E, phase: InstallPhase) {
    if let Err(e) = engine.rollback() {
        warn!(%phase, "Rollback failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewriter::{PassthroughRewriter, RewriteError};
    use mylite_error::{ErrorCode, ErrorContext};
    use rusqlite::Connection;

    fn fast_retry() -> RetrySettings {
        RetrySettings {
            max_attempts: 3,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    fn object_names(conn: &Connection, kind: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = ?1 AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let names = stmt
            .query_map([kind], |r| r.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn test_plan_defers_standalone_indexes() {
        let installer = SchemaInstaller::new(PassthroughRewriter, fast_retry());
        let plan = installer
            .plan("CREATE INDEX i ON a(x); CREATE TABLE a (x int); CREATE TABLE b (y int)")
            .unwrap();
        assert_eq!(plan.tables, vec!["CREATE TABLE a (x int)", "CREATE TABLE b (y int)"]);
        assert_eq!(plan.indexes, vec!["CREATE INDEX i ON a(x)"]);
    }

    #[test]
    fn test_duplicate_index_names_are_renamed() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut installer = SchemaInstaller::new(PassthroughRewriter, fast_retry());

        let report = installer
            .install(
                &mut conn,
                "CREATE TABLE wp_postmeta (meta_key TEXT);
                 CREATE INDEX meta_key ON wp_postmeta(meta_key);
                 CREATE TABLE wp_usermeta (meta_key TEXT);
                 CREATE INDEX meta_key ON wp_usermeta(meta_key);",
            )
            .unwrap();

        assert_eq!(installer.state(), InstallState::Done);
        assert_eq!(report.tables_executed, 2);
        assert_eq!(report.indexes_executed, 2);
        assert_eq!(report.renamed.len(), 1);
        let (original, replacement) = &report.renamed[0];
        assert_eq!(original, "meta_key");
        assert_ne!(replacement, "meta_key");

        let indexes = object_names(&conn, "index");
        assert_eq!(indexes.len(), 2);
        assert!(indexes.contains(&"meta_key".to_string()));
        assert!(indexes.contains(replacement));
    }

    #[test]
    fn test_table_failure_rolls_back_whole_phase() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut installer = SchemaInstaller::new(PassthroughRewriter, fast_retry());

        let err = installer
            .install(
                &mut conn,
                "CREATE TABLE good (id INTEGER); CREATE TABEL broken (id INTEGER); CREATE TABLE later (id INTEGER)",
            )
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StatementFailed);
        assert_eq!(installer.state(), InstallState::Failed);
        match err.context {
            Some(ErrorContext::Statement {
                phase, statement, ..
            }) => {
                assert_eq!(phase, InstallPhase::Tables);
                assert_eq!(statement, "CREATE TABEL broken (id INTEGER)");
            }
            other => panic!("unexpected context: {:?}", other),
        }
        assert!(object_names(&conn, "table").is_empty());
    }

    #[test]
    fn test_index_failure_keeps_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut installer = SchemaInstaller::new(PassthroughRewriter, fast_retry());

        let err = installer
            .install(
                &mut conn,
                "CREATE TABLE t (a INTEGER); CREATE INDEX ia ON t(missing_column)",
            )
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StatementFailed);
        assert_eq!(object_names(&conn, "table"), vec!["t".to_string()]);
        assert!(object_names(&conn, "index").is_empty());
    }

    #[test]
    fn test_rewrite_failure_executes_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        let rewriter = |statement: &str| {
            if statement.starts_with("CREATE FULLTEXT") {
                Err(RewriteError::Unsupported(statement.to_string()))
            } else {
                Ok(Rewritten::Single(statement.to_string()))
            }
        };
        let mut installer = SchemaInstaller::new(rewriter, fast_retry());

        let err = installer
            .install(
                &mut conn,
                "CREATE TABLE t (a TEXT); CREATE FULLTEXT INDEX ft ON t(a)",
            )
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::RewriteFailed);
        assert!(object_names(&conn, "table").is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut installer = SchemaInstaller::new(PassthroughRewriter, fast_retry());
        let err = installer.install(&mut conn, " ; -- nothing\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyBatch);
        assert_eq!(installer.state(), InstallState::Failed);
    }

    #[test]
    fn test_terminal_states() {
        assert!(InstallState::Done.is_terminal());
        assert!(InstallState::Failed.is_terminal());
        assert!(!InstallState::TablesApplied.is_terminal());
    }
}
