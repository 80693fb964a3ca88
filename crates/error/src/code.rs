use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following MYLITE-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Function emulation errors
/// - **2000-2999**: Schema installation errors
/// - **3000-3999**: Configuration errors
/// - **4000-4999**: Engine errors
/// - **5000-5999**: Internal/System errors
///
/// Codes are stable across versions (semver contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Function Errors (1000-1999) ===
    /// MYLITE-1001: Rewriter emitted a function with no emulation
    UnsupportedFunction = 1001,
    /// MYLITE-1002: Call shape does not match the declared arity
    ArityMismatch = 1002,
    /// MYLITE-1003: Interval text matches no supported unit grammar
    MalformedInterval = 1003,
    /// MYLITE-1004: Date/time argument could not be parsed
    InvalidDateValue = 1004,
    /// MYLITE-1005: Regular expression failed to compile
    InvalidPattern = 1005,
    /// MYLITE-1006: Argument of the wrong kind
    InvalidArgument = 1006,

    // === Schema Errors (2000-2999) ===
    /// MYLITE-2001: A DDL statement failed in the engine
    StatementFailed = 2001,
    /// MYLITE-2002: Busy/locked contention outlasted the retry budget
    ContentionExhausted = 2002,
    /// MYLITE-2003: The statement rewriter rejected a statement
    RewriteFailed = 2003,
    /// MYLITE-2004: DDL batch contained no statements
    EmptyBatch = 2004,

    // === Configuration Errors (3000-3999) ===
    /// MYLITE-3001: Configuration failed to load or validate
    InvalidConfig = 3001,
    /// MYLITE-3002: Database path could not be resolved
    InvalidDatabasePath = 3002,

    // === Engine Errors (4000-4999) ===
    /// MYLITE-4001: Non-transient engine failure
    EngineFailure = 4001,
    /// MYLITE-4002: Engine reported busy/locked
    EngineBusy = 4002,
    /// MYLITE-4003: Database could not be opened
    ConnectionFailed = 4003,

    // === Internal Errors (5000-5999) ===
    /// MYLITE-5002: Serialization/deserialization failed
    SerializationFailed = 5002,
    /// MYLITE-5003: Unexpected internal state
    InternalPanic = 5003,

    /// MYLITE-9999: Unknown/unclassified error
    Unknown = 9999,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "MYLITE-2001")
    pub fn as_str(&self) -> String {
        format!("MYLITE-{:04}", self.as_u16())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Function,
            2000..=2999 => ErrorCategory::Schema,
            3000..=3999 => ErrorCategory::Config,
            4000..=4999 => ErrorCategory::Engine,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        // Parse "MYLITE-XXXX" format
        let num: u16 = s
            .strip_prefix("MYLITE-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::UnsupportedFunction),
            1002 => Ok(Self::ArityMismatch),
            1003 => Ok(Self::MalformedInterval),
            1004 => Ok(Self::InvalidDateValue),
            1005 => Ok(Self::InvalidPattern),
            1006 => Ok(Self::InvalidArgument),
            2001 => Ok(Self::StatementFailed),
            2002 => Ok(Self::ContentionExhausted),
            2003 => Ok(Self::RewriteFailed),
            2004 => Ok(Self::EmptyBatch),
            3001 => Ok(Self::InvalidConfig),
            3002 => Ok(Self::InvalidDatabasePath),
            4001 => Ok(Self::EngineFailure),
            4002 => Ok(Self::EngineBusy),
            4003 => Ok(Self::ConnectionFailed),
            5002 => Ok(Self::SerializationFailed),
            5003 => Ok(Self::InternalPanic),
            9999 => Ok(Self::Unknown),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level error category, used by hosts to pick a failure path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Function,
    Schema,
    Config,
    Engine,
    Internal,
}
