use crate::rewriter::RewriteError;
use mylite_error::{InstallPhase, MyliteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Schema batch contains no statements")]
    EmptyBatch,

    #[error("Failed to rewrite statement: {source}")]
    Rewrite {
        statement: String,
        #[source]
        source: RewriteError,
    },

    #[error("Statement failed during {phase} phase: {source}")]
    Statement {
        phase: InstallPhase,
        statement: String,
        #[source]
        source: MyliteError,
    },

    #[error("Commit of {phase} phase still contended after {attempts} attempts")]
    Contention {
        phase: InstallPhase,
        attempts: u32,
        statement: String,
    },
}

impl InstallError {
    pub fn to_mylite_error(self) -> MyliteError {
        use mylite_error::{ErrorCode, ErrorContext};

        match self {
            InstallError::EmptyBatch => MyliteError::new(
                ErrorCode::EmptyBatch,
                "Schema batch contains no statements",
            )
            .with_hint("Check that the schema definition was loaded"),
            InstallError::Rewrite { statement, source } => {
                let diagnostic = source.to_string();
                MyliteError::new(
                    ErrorCode::RewriteFailed,
                    format!("Failed to rewrite statement: {}", diagnostic),
                )
                .with_context(ErrorContext::Statement {
                    phase: InstallPhase::Rewrite,
                    statement,
                    diagnostic,
                })
                .with_hint("The statement rewriter does not support this DDL shape")
            }
            InstallError::Statement {
                phase,
                statement,
                source,
            } => MyliteError::new(
                ErrorCode::StatementFailed,
                format!("Statement failed during {} phase: {}", phase, source.message),
            )
            .with_context(ErrorContext::Statement {
                phase,
                statement,
                diagnostic: source.message,
            })
            .with_hint("Installation was rolled back; no statement of this phase was applied"),
            InstallError::Contention {
                phase,
                attempts,
                statement,
            } => MyliteError::new(
                ErrorCode::ContentionExhausted,
                format!(
                    "Commit of {} phase still contended after {} attempts",
                    phase, attempts
                ),
            )
            .with_context(ErrorContext::Contention {
                attempts,
                statement,
            })
            .with_hint("Another connection holds the database lock; raise installer.retry.max_attempts or database.busy_timeout_ms"),
        }
    }
}

impl From<InstallError> for MyliteError {
    fn from(err: InstallError) -> Self {
        err.to_mylite_error()
    }
}
