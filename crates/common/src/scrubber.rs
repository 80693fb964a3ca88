use once_cell::sync::Lazy;
use regex::Regex;

/// Redaction for SQL text written to logs.
///
/// Best-effort and regex based. Statements that fail during installation are
/// logged after scrubbing; the error value handed to the host keeps the
/// original text.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").unwrap());

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+?1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}").unwrap());

/// Password hashes as stored by PHP-style hosts ($P$, $2y$, $argon2...).
static HASH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(?:P|H|2[aby]|argon2\w*)\$[^\s']+").unwrap());

/// Logged statements are truncated to this many characters.
pub const MAX_LOGGED_CHARS: usize = 512;

pub fn scrub(input: &str) -> String {
    let scrubbed = EMAIL_REGEX.replace_all(input, "[EMAIL]");
    let scrubbed = HASH_REGEX.replace_all(&scrubbed, "[HASH]");
    let scrubbed = PHONE_REGEX.replace_all(&scrubbed, "[PHONE]");
    truncate(&scrubbed, MAX_LOGGED_CHARS)
}

fn truncate(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &input[..idx]),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_email() {
        let input = "INSERT INTO wp_users (user_email) VALUES ('admin@example.com')";
        assert_eq!(
            scrub(input),
            "INSERT INTO wp_users (user_email) VALUES ('[EMAIL]')"
        );
    }

    #[test]
    fn test_scrub_password_hash() {
        let input = "UPDATE wp_users SET user_pass = '$P$BxyzAbc123/' WHERE ID = 1";
        assert_eq!(
            scrub(input),
            "UPDATE wp_users SET user_pass = '[HASH]' WHERE ID = 1"
        );
    }

    #[test]
    fn test_ddl_passes_through() {
        let input = "CREATE INDEX IF NOT EXISTS meta_key ON wp_postmeta(meta_key)";
        assert_eq!(scrub(input), input);
    }

    #[test]
    fn test_long_statement_truncated() {
        let input = "x".repeat(MAX_LOGGED_CHARS + 10);
        let out = scrub(&input);
        assert_eq!(out.chars().count(), MAX_LOGGED_CHARS + 1);
        assert!(out.ends_with('…'));
    }
}
