//! String built-ins, plus the `substring`/`ucase`/`lcase` rewrites.

use crate::error::FunctionError;
use crate::registry::Call;
use crate::value;
use regex::RegexBuilder;
use rusqlite::types::Value;
use std::net::Ipv4Addr;

pub fn char_length(call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(match value::text(call.arg(0)) {
        Some(s) => Value::Integer(s.chars().count() as i64),
        None => Value::Null,
    })
}

pub fn md5(call: &Call<'_>) -> Result<Value, FunctionError> {
    let digest = match call.arg(0) {
        Value::Null => return Ok(Value::Null),
        Value::Blob(bytes) => md5::compute(bytes),
        other => md5::compute(value::text(other).unwrap_or_default().as_bytes()),
    };
    Ok(Value::Text(format!("{:x}", digest)))
}

/// NULL if any argument is NULL, otherwise the concatenated string forms.
pub fn concat(call: &Call<'_>) -> Result<Value, FunctionError> {
    let mut out = String::new();
    for arg in call.args {
        match value::text(arg) {
            Some(s) => out.push_str(&s),
            None => return Ok(Value::Null),
        }
    }
    Ok(Value::Text(out))
}

/// 1-based index of the first argument among the rest, 0 when absent.
///
/// A first argument of the form `table.column` naming a known host table
/// always yields 0.
pub fn field(call: &Call<'_>) -> Result<Value, FunctionError> {
    let Some((needle, haystack)) = call.args.split_first() else {
        return Ok(Value::Integer(0));
    };
    if haystack.is_empty() || matches!(needle, Value::Null) {
        return Ok(Value::Integer(0));
    }

    if let Some(text) = value::text(needle) {
        if let Some((qualifier, _)) = text.split_once('.') {
            let schema = &call.env.schema;
            let prefix = schema.table_prefix();
            let table = if prefix.is_empty() {
                qualifier
            } else {
                qualifier.strip_prefix(prefix).unwrap_or(qualifier)
            };
            let table = table.trim();
            if !table.is_empty() && schema.has_table(table) {
                return Ok(Value::Integer(0));
            }
        }
    }

    Ok(Value::Integer(
        haystack
            .iter()
            .position(|candidate| value::loosely_equal(needle, candidate))
            .map(|i| i as i64 + 1)
            .unwrap_or(0),
    ))
}

/// 1-based position of `needle` in `haystack`.
///
/// `pos` is a 0-based character offset to start searching from; negative
/// offsets search from the start.
pub fn locate(call: &Call<'_>) -> Result<Value, FunctionError> {
    let (Some(needle), Some(haystack)) = (value::text(call.arg(0)), value::text(call.arg(1)))
    else {
        return Ok(Value::Null);
    };
    let start = match call.opt_arg(2) {
        None => 0,
        Some(Value::Null) => return Ok(Value::Null),
        Some(v) => value::to_i64(v).ok_or_else(|| FunctionError::InvalidArgument {
            function: call.name,
            message: "position must be an integer".to_string(),
        })?,
    };
    let skip = start.max(0) as usize;

    let Some((byte_offset, _)) = haystack.char_indices().nth(skip).or_else(|| {
        // Searching from just past the end can still match the empty needle.
        (skip == haystack.chars().count()).then_some((haystack.len(), ' '))
    }) else {
        return Ok(Value::Integer(0));
    };

    Ok(Value::Integer(
        match haystack[byte_offset..].find(needle.as_str()) {
            Some(found) => {
                let chars_before = haystack[..byte_offset + found].chars().count();
                chars_before as i64 + 1
            }
            None => 0,
        },
    ))
}

/// Case-insensitive match returning 1/0. A NULL subject never matches.
pub fn regexp(call: &Call<'_>) -> Result<Value, FunctionError> {
    let Some(subject) = value::text(call.arg(0)) else {
        return Ok(Value::Integer(0));
    };
    let Some(pattern) = value::text(call.arg(1)) else {
        return Ok(Value::Integer(0));
    };
    let re = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
    Ok(Value::Integer(re.is_match(&subject) as i64))
}

pub fn inet_ntoa(call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(value::to_i64(call.arg(0))
        .and_then(|n| u32::try_from(n).ok())
        .map(|n| Value::Text(Ipv4Addr::from(n).to_string()))
        .unwrap_or(Value::Null))
}

/// Unparseable addresses give 0.
pub fn inet_aton(call: &Call<'_>) -> Result<Value, FunctionError> {
    let Some(addr) = value::text(call.arg(0)) else {
        return Ok(Value::Null);
    };
    Ok(Value::Integer(
        addr.trim()
            .parse::<Ipv4Addr>()
            .map(|ip| u32::from(ip) as i64)
            .unwrap_or(0),
    ))
}

pub fn substring(args: &[String]) -> String {
    format!("substr({})", args.join(", "))
}

pub fn ucase(args: &[String]) -> String {
    format!("upper({})", args.join(", "))
}

pub fn lcase(args: &[String]) -> String {
    format!("lower({})", args.join(", "))
}
