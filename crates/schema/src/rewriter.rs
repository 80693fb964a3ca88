use thiserror::Error;

/// Result of translating one dialect statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewritten {
    Single(String),
    /// A table statement plus index statements to run after every table.
    Table { table: String, indexes: Vec<String> },
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Unsupported statement: {0}")]
    Unsupported(String),

    #[error("Rewrite failed: {0}")]
    Failed(String),
}

/// Translates MySQL-dialect DDL into SQLite statements.
pub trait QueryRewriter {
    fn rewrite(&self, statement: &str) -> Result<Rewritten, RewriteError>;
}

/// For batches already written in SQLite's dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRewriter;

impl QueryRewriter for PassthroughRewriter {
    fn rewrite(&self, statement: &str) -> Result<Rewritten, RewriteError> {
        Ok(Rewritten::Single(statement.to_string()))
    }
}

impl<F> QueryRewriter for F
where
    F: Fn(&str) -> Result<Rewritten, RewriteError>,
{
    fn rewrite(&self, statement: &str) -> Result<Rewritten, RewriteError> {
        self(statement)
    }
}
