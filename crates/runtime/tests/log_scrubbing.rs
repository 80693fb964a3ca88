use anyhow::Result;
use mylite_functions::StaticSchema;
use mylite_runtime::CompatConnection;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn test_statement_text_is_scrubbed_in_logs() -> Result<()> {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || -> Result<()> {
        let conn = CompatConnection::open_in_memory(Arc::new(StaticSchema::empty()))?;
        conn.execute("CREATE TABLE wp_users (user_email TEXT)", [])?;
        conn.execute(
            "INSERT INTO wp_users (user_email) VALUES (lcase('Alice@Example.com'))",
            [],
        )?;
        let stored: String = conn.query_scalar("SELECT user_email FROM wp_users", [])?;
        assert_eq!(stored, "alice@example.com");
        Ok(())
    })?;

    let logs = captured.text();
    assert!(logs.contains("Rewrote statement"), "{}", logs);
    assert!(logs.contains("[EMAIL]"), "{}", logs);
    assert!(!logs.to_lowercase().contains("alice@example.com"), "{}", logs);
    Ok(())
}
