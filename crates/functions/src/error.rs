use sqlparser::parser::ParserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Unsupported function '{name}'")]
    Unsupported { name: String, known: Vec<String> },

    #[error("{function}() expects {expected} argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: String,
        actual: usize,
    },

    #[error("Malformed interval expression '{0}'")]
    MalformedInterval(String),

    #[error("Invalid date value '{value}' passed to {function}()")]
    InvalidDate {
        function: &'static str,
        value: String,
    },

    #[error("Invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid argument for {function}(): {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },

    #[error("SQL Parser error: {0}")]
    Parser(#[from] ParserError),
}

impl FunctionError {
    pub fn to_mylite_error(self) -> mylite_error::MyliteError {
        use mylite_error::{ErrorCode, ErrorContext, MyliteError};

        match self {
            FunctionError::Unsupported { name, known } => {
                MyliteError::unsupported_function(&name, known)
            }
            FunctionError::Arity {
                function,
                expected,
                actual,
            } => MyliteError::new(
                ErrorCode::ArityMismatch,
                format!(
                    "{}() expects {} argument(s), got {}",
                    function, expected, actual
                ),
            )
            .with_context(ErrorContext::Arity {
                function: function.to_string(),
                expected,
                actual,
            }),
            FunctionError::MalformedInterval(text) => MyliteError::new(
                ErrorCode::MalformedInterval,
                format!("Malformed interval expression '{}'", text),
            )
            .with_context(ErrorContext::Interval { text })
            .with_hint(
                "Expected INTERVAL <quantity> <unit> with a SECOND..YEAR or compound unit",
            ),
            FunctionError::InvalidDate { function, value } => MyliteError::new(
                ErrorCode::InvalidDateValue,
                format!("Invalid date value '{}' passed to {}()", value, function),
            )
            .with_hint("Dates are expected as 'YYYY-MM-DD' or 'YYYY-MM-DD HH:MM:SS'"),
            FunctionError::InvalidPattern(e) => MyliteError::new(
                ErrorCode::InvalidPattern,
                format!("Invalid regular expression: {}", e),
            ),
            FunctionError::InvalidArgument { function, message } => MyliteError::new(
                ErrorCode::InvalidArgument,
                format!("Invalid argument for {}(): {}", function, message),
            ),
            FunctionError::Parser(e) => MyliteError::new(
                ErrorCode::RewriteFailed,
                format!("Rewritten fragment failed to parse: {}", e),
            )
            .with_hint("A syntax-rewrite function produced SQL the parser rejected"),
        }
    }
}

impl From<FunctionError> for mylite_error::MyliteError {
    fn from(err: FunctionError) -> Self {
        err.to_mylite_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mylite_error::{ErrorCode, ErrorContext};

    #[test]
    fn test_arity_error_carries_context() {
        let err = FunctionError::Arity {
            function: "locate",
            expected: "2..=3".to_string(),
            actual: 1,
        }
        .to_mylite_error();

        assert_eq!(err.code, ErrorCode::ArityMismatch);
        match err.context {
            Some(ErrorContext::Arity {
                function, actual, ..
            }) => {
                assert_eq!(function, "locate");
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected context: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_suggests_known_name() {
        let err = FunctionError::Unsupported {
            name: "unix_timestmp".to_string(),
            known: vec!["unix_timestamp".to_string(), "utc_time".to_string()],
        }
        .to_mylite_error();

        assert_eq!(err.code, ErrorCode::UnsupportedFunction);
        assert_eq!(err.hint.as_deref(), Some("Did you mean 'unix_timestamp'?"));
    }
}
