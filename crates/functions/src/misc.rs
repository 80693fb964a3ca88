use crate::error::FunctionError;
use crate::registry::Call;
use crate::value;
use rusqlite::types::Value;

/// Always-true predicate used in place of advisory locking.
const LOCK_STUB: &str = "1=1";

pub fn isnull(call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Integer(matches!(call.arg(0), Value::Null) as i64))
}

/// `IF(expr, a, b)` with MySQL's loose truthiness, see [`value::is_falsy`].
pub fn if_(call: &Call<'_>) -> Result<Value, FunctionError> {
    let branch = if value::is_falsy(call.arg(0)) { 2 } else { 1 };
    Ok(call.arg(branch).clone())
}

pub fn version(call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Text(call.env.version.clone()))
}

pub fn get_lock(_args: &[String]) -> String {
    LOCK_STUB.to_string()
}

pub fn release_lock(_args: &[String]) -> String {
    LOCK_STUB.to_string()
}
