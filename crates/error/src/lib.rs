//! # mylite-error
//!
//! Unified error types for the mylite compatibility layer.
//!
//! Every failure that crosses a crate boundary is a [`MyliteError`] with:
//! - A stable numeric code (MYLITE-XXXX)
//! - Structured JSON context
//! - An optional hint for the host application

mod code;
mod context;
mod convert;

pub use code::{ErrorCategory, ErrorCode};
pub use context::{ErrorContext, InstallPhase};
pub use convert::find_closest_match;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unified error type for all mylite operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyliteError {
    /// Numeric error code (e.g., "MYLITE-1001")
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Structured context for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Suggestion for the host application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Correlation ID, usually the installation run or query span
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl MyliteError {
    /// Create a new error with code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
            trace_id: None,
        }
    }

    /// Add structured context
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Add trace ID for correlation
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Build an `UnsupportedFunction` error, suggesting the closest known name.
    pub fn unsupported_function<I, S>(function: &str, known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known_functions: Vec<String> = known.into_iter().map(Into::into).collect();
        known_functions.sort();

        let hint = find_closest_match(&function.to_lowercase(), &known_functions);
        let mut error = MyliteError::new(
            ErrorCode::UnsupportedFunction,
            format!("Unsupported function '{}'", function),
        )
        .with_context(ErrorContext::UnsupportedFunction {
            function: function.to_string(),
            known_functions,
        });

        error = match hint {
            Some(closest) => error.with_hint(format!("Did you mean '{}'?", closest)),
            None => error.with_hint("The statement rewriter emitted a function with no emulation"),
        };
        error
    }

    /// True when the engine reported transient busy/locked contention.
    pub fn is_contention(&self) -> bool {
        self.code == ErrorCode::EngineBusy
    }

    /// Serialize to JSON for host-side error reporting
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize MyliteError: {}", e);
            format!(
                r#"{{"code":"{}","message":"Serialization failed"}}"#,
                self.code
            )
        })
    }

    /// Serialize to pretty JSON for logging
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

impl fmt::Display for MyliteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (Hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for MyliteError {}

/// Result type alias for mylite operations
pub type Result<T> = std::result::Result<T, MyliteError>;
