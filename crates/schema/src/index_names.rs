//! Index name tracking for one installation run.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

// An optional `schema.` qualifier is skipped; the last component is captured.
static CREATE_INDEX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?i)^\s*CREATE\s+(?:UNIQUE\s+)?INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?"#,
        r#"(?:(?:"[^"]+"|`[^`]+`|\[[^\]]+\]|[A-Za-z_][A-Za-z0-9_$]*)\s*\.\s*)?"#,
        r#"(?:"([^"]+)"|`([^`]+)`|\[([^\]]+)\]|([A-Za-z_][A-Za-z0-9_$]*))"#,
    ))
    .unwrap()
});

/// Upper bound (exclusive) of the numeric suffix appended on collision.
const SUFFIX_RANGE: u32 = 10_000;

/// Name of the index a `CREATE INDEX` statement creates and where it sits
/// in the statement text.
pub fn index_name(statement: &str) -> Option<(Range<usize>, &str)> {
    let caps = CREATE_INDEX_REGEX.captures(statement)?;
    let m = (1..=4).find_map(|i| caps.get(i))?;
    Some((m.range(), m.as_str()))
}

pub fn is_index_statement(statement: &str) -> bool {
    CREATE_INDEX_REGEX.is_match(statement)
}

/// Index names created so far in the run. Comparison ignores case, as
/// SQLite does.
#[derive(Debug, Default)]
pub struct IndexNameRegistry {
    used: HashSet<String>,
}

impl IndexNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }

    /// Record the statement's index name, renaming it first if taken.
    ///
    /// Returns the statement to execute and, when renamed, the
    /// `(original, replacement)` pair.
    pub fn claim(&mut self, statement: &str) -> (String, Option<(String, String)>) {
        let Some((range, name)) = index_name(statement) else {
            return (statement.to_string(), None);
        };

        if self.used.insert(name.to_lowercase()) {
            return (statement.to_string(), None);
        }

        let mut rng = rand::thread_rng();
        let replacement = loop {
            let candidate = format!("{}_{}", name, rng.gen_range(0..SUFFIX_RANGE));
            if self.used.insert(candidate.to_lowercase()) {
                break candidate;
            }
        };

        let mut renamed = String::with_capacity(statement.len() + 6);
        renamed.push_str(&statement[..range.start]);
        renamed.push_str(&replacement);
        renamed.push_str(&statement[range.end..]);
        (renamed, Some((name.to_string(), replacement)))
    }
}
