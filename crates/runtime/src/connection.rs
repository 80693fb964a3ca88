use mylite_common::config::{AppConfig, RetrySettings};
use mylite_common::scrubber::scrub;
use mylite_error::{ErrorCode, ErrorContext, MyliteError, Result};
use mylite_functions::{bind_registry, FunctionEnv, FunctionRegistry, SchemaMetadata, StatementRewriter};
use mylite_schema::{InstallReport, QueryRewriter, SchemaInstaller};
use rusqlite::types::{FromSql, Value};
use rusqlite::{Connection, Params};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// A SQLite connection with the MySQL function table bound to it.
///
/// The registry is built once when the connection opens and is shared with
/// every bound function; it is never mutated afterwards.
pub struct CompatConnection {
    conn: Connection,
    registry: Arc<FunctionRegistry>,
    retry: RetrySettings,
}

impl CompatConnection {
    /// Open the database described by `config` and bind the emulated functions.
    #[instrument(skip_all, fields(in_memory = config.database.in_memory))]
    pub fn open(config: &AppConfig, schema: Arc<dyn SchemaMetadata>) -> Result<Self> {
        let conn = if config.database.in_memory {
            Connection::open_in_memory()?
        } else {
            let path = config.database.resolve_path()?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MyliteError::new(
                        ErrorCode::ConnectionFailed,
                        format!("Cannot create database directory {}: {}", parent.display(), e),
                    )
                })?;
            }
            info!(path = %path.display(), "Opening database");
            Connection::open(&path).map_err(|e| {
                MyliteError::new(
                    ErrorCode::ConnectionFailed,
                    format!("Cannot open database {}: {}", path.display(), e),
                )
                .with_context(ErrorContext::Config {
                    file_path: Some(path.display().to_string()),
                    field: Some("database.path".to_string()),
                })
            })?
        };

        conn.busy_timeout(Duration::from_millis(config.database.busy_timeout_ms))?;

        let env = FunctionEnv {
            schema,
            version: config.functions.version_string.clone(),
        };
        Self::with_registry(conn, Arc::new(FunctionRegistry::mysql(env)), config.installer.retry)
    }

    /// In-memory database with default settings.
    pub fn open_in_memory(schema: Arc<dyn SchemaMetadata>) -> Result<Self> {
        let mut config = AppConfig::default();
        config.database.in_memory = true;
        Self::open(&config, schema)
    }

    /// Wrap an already opened connection.
    pub fn with_registry(
        conn: Connection,
        registry: Arc<FunctionRegistry>,
        retry: RetrySettings,
    ) -> Result<Self> {
        bind_registry(&conn, &registry)?;
        Ok(Self {
            conn,
            registry,
            retry,
        })
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Apply the syntax-rewrite pass to `sql`.
    pub fn prepare_sql<'s>(&self, sql: &'s str) -> Result<Cow<'s, str>> {
        let rewritten = StatementRewriter::new(&self.registry).rewrite(sql)?;
        if let Cow::Owned(ref out) = rewritten {
            debug!(original = %scrub(sql), rewritten = %scrub(out), "Rewrote statement");
        }
        Ok(rewritten)
    }

    #[instrument(skip_all, fields(sql = %scrub(sql)))]
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        let sql = self.prepare_sql(sql)?;
        self.conn
            .execute(&sql, params)
            .map_err(|e| self.engine_error(e))
    }

    /// First column of the first row.
    #[instrument(skip_all, fields(sql = %scrub(sql)))]
    pub fn query_scalar<T: FromSql, P: Params>(&self, sql: &str, params: P) -> Result<T> {
        let sql = self.prepare_sql(sql)?;
        self.conn
            .query_row(&sql, params, |row| row.get(0))
            .map_err(|e| self.engine_error(e))
    }

    #[instrument(skip_all, fields(sql = %scrub(sql)))]
    pub fn query_rows<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Vec<Value>>> {
        let sql = self.prepare_sql(sql)?;
        let mut stmt = self.conn.prepare(&sql).map_err(|e| self.engine_error(e))?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map(params, |row| (0..columns).map(|i| row.get(i)).collect())
            .map_err(|e| self.engine_error(e))?
            .collect::<std::result::Result<Vec<Vec<Value>>, _>>()
            .map_err(|e| self.engine_error(e))?;
        Ok(rows)
    }

    /// Install a MySQL-dialect DDL batch through `rewriter`.
    pub fn install_schema<R: QueryRewriter>(
        &mut self,
        rewriter: R,
        batch: &str,
    ) -> Result<InstallReport> {
        SchemaInstaller::new(rewriter, self.retry).install(&mut self.conn, batch)
    }

    /// Map an engine error, filling in the known function names for
    /// unsupported-function failures so the hint can name a close match.
    fn engine_error(&self, err: rusqlite::Error) -> MyliteError {
        let error = MyliteError::from(err);
        match &error.context {
            Some(ErrorContext::UnsupportedFunction {
                function,
                known_functions,
            }) if known_functions.is_empty() && !function.is_empty() => {
                MyliteError::unsupported_function(function, self.registry.names())
            }
            _ => error,
        }
    }
}

impl std::fmt::Debug for CompatConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatConnection")
            .field("path", &self.conn.path())
            .field("functions", &self.registry.names().len())
            .field("retry", &self.retry)
            .finish()
    }
}
