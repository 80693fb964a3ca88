use crate::{ErrorCode, ErrorContext, MyliteError};

const NO_SUCH_FUNCTION: &str = "no such function: ";

impl From<rusqlite::Error> for MyliteError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(ffi_err, msg) => {
                let diagnostic = msg.clone().unwrap_or_else(|| ffi_err.to_string());
                match ffi_err.code {
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                        MyliteError::new(ErrorCode::EngineBusy, diagnostic)
                            .with_hint("Another connection holds a lock on the database")
                    }
                    rusqlite::ErrorCode::CannotOpen => {
                        MyliteError::new(ErrorCode::ConnectionFailed, diagnostic)
                    }
                    _ => from_diagnostic(&diagnostic),
                }
            }
            rusqlite::Error::SqlInputError { error, msg, .. } => match error.code {
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    MyliteError::new(ErrorCode::EngineBusy, msg.clone())
                }
                _ => from_diagnostic(msg),
            },
            rusqlite::Error::UserFunctionError(inner) => match inner.downcast_ref::<MyliteError>() {
                Some(mylite) => mylite.clone(),
                None => from_diagnostic(&inner.to_string()),
            },
            _ => MyliteError::new(ErrorCode::EngineFailure, err.to_string()),
        }
    }
}

/// Recover a coded error from an engine diagnostic string.
///
/// Emulated functions raise `[MYLITE-XXXX] message`, which SQLite hands back
/// as plain text; the code prefix is parsed back out here.
fn from_diagnostic(diagnostic: &str) -> MyliteError {
    if let Some((_, rest)) = diagnostic.split_once(NO_SUCH_FUNCTION) {
        let name: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        return MyliteError::new(
            ErrorCode::UnsupportedFunction,
            format!("Unsupported function '{}'", name),
        )
        .with_context(ErrorContext::UnsupportedFunction {
            function: name,
            known_functions: vec![],
        });
    }

    if let Some(rest) = diagnostic.strip_prefix('[') {
        if let Some((code, message)) = rest.split_once("] ") {
            if let Ok(code) = ErrorCode::try_from(code.to_string()) {
                let (message, hint) = match message.rsplit_once(" (Hint: ") {
                    Some((m, h)) => (m, h.strip_suffix(')')),
                    None => (message, None),
                };
                let mut error = MyliteError::new(code, message);
                if let Some(hint) = hint {
                    error = error.with_hint(hint);
                }
                return error;
            }
        }
    }

    MyliteError::new(ErrorCode::EngineFailure, diagnostic)
}

impl From<std::io::Error> for MyliteError {
    fn from(err: std::io::Error) -> Self {
        MyliteError::new(ErrorCode::EngineFailure, err.to_string())
    }
}

impl From<serde_json::Error> for MyliteError {
    fn from(err: serde_json::Error) -> Self {
        MyliteError::new(ErrorCode::SerializationFailed, err.to_string())
    }
}

/// Levenshtein-based suggestion, used for "did you mean" hints.
pub fn find_closest_match(target: &str, options: &[String]) -> Option<String> {
    let mut best_match: Option<&str> = None;
    let mut min_distance = usize::MAX;

    for option in options {
        let distance = levenshtein(target, option);
        if distance < min_distance && distance <= 3 {
            min_distance = distance;
            best_match = Some(option.as_str());
        }
    }

    best_match.map(|s| s.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut dp = vec![vec![0; b.len() + 1]; a.len() + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, val) in dp[0].iter_mut().enumerate() {
        *val = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = std::cmp::min(
                std::cmp::min(dp[i - 1][j] + 1, dp[i][j - 1] + 1),
                dp[i - 1][j - 1] + cost,
            );
        }
    }

    dp[a.len()][b.len()]
}
