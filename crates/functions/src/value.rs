//! Coercion rules shared by the function implementations.
//!
//! SQLite hands functions dynamically typed values. MySQL code relies on
//! loose conversions between them, so each rule the emulations depend on is
//! spelled out here instead of leaning on Rust's own conversions.

use rusqlite::types::Value;
use std::cmp::Ordering;

/// String form of a value, `None` for NULL.
///
/// Reals without a fractional part print as integers (`2.0` -> `"2"`), the
/// way MySQL renders them inside string functions.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(format_real(*f)),
        Value::Text(s) => Some(s.clone()),
        Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

pub fn format_real(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Falsy set for `IF()`: 0, 0.0, `""`, `"0"`, NULL and the empty blob.
/// Everything else is truthy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Integer(i) => *i == 0,
        Value::Real(f) => *f == 0.0,
        Value::Text(s) => s.is_empty() || s == "0",
        Value::Blob(b) => b.is_empty(),
    }
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(f) => Some(*f),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Real(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Integer(_) | Value::Real(_))
}

/// Equality used by `FIELD()`.
///
/// Compares numerically when either side is a number and both sides convert,
/// otherwise as case-insensitive text.
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    if is_numeric(a) || is_numeric(b) {
        if let (Some(x), Some(y)) = (to_f64(a), to_f64(b)) {
            return x.partial_cmp(&y) == Some(Ordering::Equal);
        }
    }
    match (text(a), text(b)) {
        (Some(x), Some(y)) => x.to_lowercase() == y.to_lowercase(),
        _ => false,
    }
}

/// Render a value as a SQL literal, for building fragments from values.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(b) => {
            let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
            format!("X'{}'", hex)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_set() {
        assert!(is_falsy(&Value::Integer(0)));
        assert!(is_falsy(&Value::Real(0.0)));
        assert!(is_falsy(&Value::Text(String::new())));
        assert!(is_falsy(&Value::Text("0".to_string())));
        assert!(is_falsy(&Value::Null));
        assert!(is_falsy(&Value::Blob(vec![])));

        assert!(!is_falsy(&Value::Integer(-1)));
        assert!(!is_falsy(&Value::Text("false".to_string())));
        assert!(!is_falsy(&Value::Text("0.0".to_string())));
        assert!(!is_falsy(&Value::Text(" ".to_string())));
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(text(&Value::Real(2.0)), Some("2".to_string()));
        assert_eq!(text(&Value::Real(2.5)), Some("2.5".to_string()));
        assert_eq!(text(&Value::Integer(-7)), Some("-7".to_string()));
        assert_eq!(text(&Value::Null), None);
    }

    #[test]
    fn test_loose_equality() {
        assert!(loosely_equal(
            &Value::Integer(3),
            &Value::Text("3.0".to_string())
        ));
        assert!(loosely_equal(
            &Value::Text("Post".to_string()),
            &Value::Text("post".to_string())
        ));
        assert!(!loosely_equal(&Value::Integer(3), &Value::Text("abc".to_string())));
        assert!(!loosely_equal(&Value::Null, &Value::Null));
    }

    #[test]
    fn test_sql_literal_escapes_quotes() {
        assert_eq!(sql_literal(&Value::Text("it's".to_string())), "'it''s'");
        assert_eq!(sql_literal(&Value::Blob(vec![0xde, 0xad])), "X'DEAD'");
        assert_eq!(sql_literal(&Value::Null), "NULL");
    }
}
