//! # Error Contexts
//!
//! Structured metadata attached to errors so hosts can react without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a schema installation run in which a statement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallPhase {
    Rewrite,
    Tables,
    Indexes,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallPhase::Rewrite => write!(f, "rewrite"),
            InstallPhase::Tables => write!(f, "tables"),
            InstallPhase::Indexes => write!(f, "indexes"),
        }
    }
}

/// Structured context for coded errors.
///
/// Each variant provides the fields relevant to that error type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    /// Context for MYLITE-1001 (UnsupportedFunction)
    UnsupportedFunction {
        function: String,
        known_functions: Vec<String>,
    },

    /// Context for MYLITE-1002 (ArityMismatch)
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Context for MYLITE-1003 (MalformedInterval)
    Interval { text: String },

    /// Context for MYLITE-2001/2002/2003 (statement failures during installation)
    Statement {
        phase: InstallPhase,
        statement: String,
        diagnostic: String,
    },

    /// Context for MYLITE-2002 (ContentionExhausted)
    Contention { attempts: u32, statement: String },

    /// Context for MYLITE-3001/3002 (config errors)
    Config {
        file_path: Option<String>,
        field: Option<String>,
    },

    /// Generic key-value context for extensibility
    Generic {
        #[serde(flatten)]
        data: std::collections::HashMap<String, serde_json::Value>,
    },
}
