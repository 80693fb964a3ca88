//! Binding value functions into a SQLite connection.

use crate::registry::FunctionRegistry;
use mylite_error::MyliteError;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Register every value function of `registry` on `conn`.
///
/// Each function is registered with variable arity; argument counts are
/// checked by the registry so a bad call reports which shapes are accepted.
/// Rewrite functions are not bound, they never reach the engine.
#[instrument(skip_all, fields(functions = tracing::field::Empty))]
pub fn bind_registry(conn: &Connection, registry: &Arc<FunctionRegistry>) -> Result<(), MyliteError> {
    let mut bound = 0usize;
    for (name, spec) in registry.value_functions() {
        let mut flags = FunctionFlags::SQLITE_UTF8;
        if spec.deterministic {
            flags |= FunctionFlags::SQLITE_DETERMINISTIC;
        }

        let registry = Arc::clone(registry);
        conn.create_scalar_function(name, -1, flags, move |ctx| {
            let args: Vec<Value> = (0..ctx.len()).map(|i| Value::from(ctx.get_raw(i))).collect();
            registry
                .evaluate(name, &args)
                .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e.to_mylite_error())))
        })?;
        bound += 1;
    }

    tracing::Span::current().record("functions", bound);
    debug!(bound, "Bound emulated functions");
    Ok(())
}
