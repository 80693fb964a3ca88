use std::collections::HashSet;
use std::fmt::Debug;
use std::panic::RefUnwindSafe;

/// Read-only view of the host's schema, consumed by `FIELD()`.
///
/// Implementations are shared with engine callbacks, hence the bounds.
pub trait SchemaMetadata: Debug + Send + Sync + RefUnwindSafe {
    /// Prefix the host puts in front of every table name (e.g. `wp_`).
    fn table_prefix(&self) -> &str;

    /// Whether `name` (without prefix) is a table the host knows about.
    fn has_table(&self, name: &str) -> bool;
}

/// Owned schema metadata with a fixed table set.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    prefix: String,
    tables: HashSet<String>,
}

impl StaticSchema {
    pub fn new<I, S>(prefix: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            tables: tables
                .into_iter()
                .map(|t| t.into().to_lowercase())
                .collect(),
        }
    }

    /// No prefix and no tables; the `FIELD()` guard never fires.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl SchemaMetadata for StaticSchema {
    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn has_table(&self, name: &str) -> bool {
        self.tables.contains(&name.to_lowercase())
    }
}
