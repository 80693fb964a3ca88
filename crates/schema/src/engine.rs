use mylite_error::MyliteError;
use rusqlite::Connection;

/// Transactional statement execution, as the installer needs it.
///
/// Errors that are transient contention must report
/// [`MyliteError::is_contention`].
pub trait DdlEngine {
    fn begin(&mut self) -> Result<(), MyliteError>;
    fn execute(&mut self, statement: &str) -> Result<(), MyliteError>;
    /// A failed commit leaves the transaction open so it can be retried.
    fn commit(&mut self) -> Result<(), MyliteError>;
    fn rollback(&mut self) -> Result<(), MyliteError>;
}

// Plain BEGIN/COMMIT rather than `rusqlite::Transaction`: a transaction
// handle rolls back when dropped after a failed commit, which would discard
// work a busy commit is about to retry.
impl DdlEngine for Connection {
    fn begin(&mut self) -> Result<(), MyliteError> {
        self.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> Result<(), MyliteError> {
        self.execute_batch(statement)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), MyliteError> {
        self.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), MyliteError> {
        if self.is_autocommit() {
            return Ok(());
        }
        self.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_persists_and_rollback_discards() {
        let mut conn = Connection::open_in_memory().unwrap();

        conn.begin().unwrap();
        DdlEngine::execute(&mut conn, "CREATE TABLE kept (id INTEGER)").unwrap();
        conn.commit().unwrap();

        conn.begin().unwrap();
        DdlEngine::execute(&mut conn, "CREATE TABLE dropped (id INTEGER)").unwrap();
        conn.rollback().unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tables, vec!["kept".to_string()]);
    }

    #[test]
    fn test_rollback_without_transaction_is_noop() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.rollback().unwrap();
    }
}
