//! Date and time built-ins.
//!
//! Dates arrive as text in MySQL's canonical `YYYY-MM-DD[ HH:MM:SS]` form.
//! `now()`, `curdate()` and the unix timestamp conversions use the local
//! timezone; the `utc_*` family uses UTC.

pub mod format;
pub mod interval;

pub use format::DATE_FORMAT_MAP;
pub use interval::{IntervalDuration, IntervalExpression, IntervalUnit};

use crate::error::FunctionError;
use crate::registry::Call;
use crate::value;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use rusqlite::types::Value;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

const ZERO_DATE: &str = "0000-00-00";

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A parsed date argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// MySQL's `0000-00-00` placeholder.
    Zero,
    At(NaiveDateTime),
}

pub fn parse_date_value(text: &str) -> Option<DateValue> {
    let text = text.trim();
    if text.starts_with(ZERO_DATE) {
        return Some(DateValue::Zero);
    }
    DATETIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .map(DateValue::At)
}

fn invalid_date(function: &'static str, text: &str) -> FunctionError {
    FunctionError::InvalidDate {
        function,
        value: text.to_string(),
    }
}

/// Parse argument `i`; `Ok(None)` for NULL.
fn date_arg(call: &Call<'_>, i: usize) -> Result<Option<DateValue>, FunctionError> {
    match value::text(call.arg(i)) {
        None => Ok(None),
        Some(text) => parse_date_value(&text)
            .map(Some)
            .ok_or_else(|| invalid_date(call.name, &text)),
    }
}

fn extract(call: &Call<'_>, field: fn(&NaiveDateTime) -> u32) -> Result<Value, FunctionError> {
    Ok(match date_arg(call, 0)? {
        None => Value::Null,
        Some(DateValue::Zero) => Value::Integer(0),
        Some(DateValue::At(dt)) => Value::Integer(field(&dt) as i64),
    })
}

pub fn month(call: &Call<'_>) -> Result<Value, FunctionError> {
    extract(call, |dt| dt.month())
}

pub fn year(call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(match date_arg(call, 0)? {
        None => Value::Null,
        Some(DateValue::Zero) => Value::Integer(0),
        Some(DateValue::At(dt)) => Value::Integer(dt.year() as i64),
    })
}

pub fn day(call: &Call<'_>) -> Result<Value, FunctionError> {
    extract(call, |dt| dt.day())
}

pub fn minute(call: &Call<'_>) -> Result<Value, FunctionError> {
    extract(call, |dt| dt.minute())
}

pub fn second(call: &Call<'_>) -> Result<Value, FunctionError> {
    extract(call, |dt| dt.second())
}

/// Also accepts bare `HH:MM[:SS]` values, where hours may exceed 23.
pub fn hour(call: &Call<'_>) -> Result<Value, FunctionError> {
    let Some(text) = value::text(call.arg(0)) else {
        return Ok(Value::Null);
    };
    match parse_date_value(&text) {
        Some(DateValue::Zero) => Ok(Value::Integer(0)),
        Some(DateValue::At(dt)) => Ok(Value::Integer(dt.hour() as i64)),
        None => bare_time_hours(&text)
            .map(Value::Integer)
            .ok_or_else(|| invalid_date(call.name, &text)),
    }
}

fn bare_time_hours(text: &str) -> Option<i64> {
    let text = text.trim();
    let parts: Vec<&str> = text.trim_start_matches('-').split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let numbers = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;
    Some(numbers[0] as i64)
}

pub fn unix_timestamp(call: &Call<'_>) -> Result<Value, FunctionError> {
    if call.args.is_empty() {
        return Ok(Value::Integer(Local::now().timestamp()));
    }
    match date_arg(call, 0)? {
        None => Ok(Value::Null),
        Some(DateValue::Zero) => Ok(Value::Integer(0)),
        Some(DateValue::At(dt)) => Local
            .from_local_datetime(&dt)
            .earliest()
            .map(|t| Value::Integer(t.timestamp()))
            .ok_or_else(|| invalid_date(call.name, &dt.format(DATETIME_FORMAT).to_string())),
    }
}

pub fn now(_call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Text(Local::now().format(DATETIME_FORMAT).to_string()))
}

pub fn curdate(_call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Text(Local::now().format(DATE_FORMAT).to_string()))
}

pub fn utc_date(_call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Text(Utc::now().format(DATE_FORMAT).to_string()))
}

pub fn utc_time(_call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Text(Utc::now().format(TIME_FORMAT).to_string()))
}

pub fn utc_timestamp(_call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Text(Utc::now().format(DATETIME_FORMAT).to_string()))
}

pub fn from_unixtime(call: &Call<'_>) -> Result<Value, FunctionError> {
    let ts = match call.arg(0) {
        Value::Null => return Ok(Value::Null),
        v => value::to_i64(v).ok_or_else(|| FunctionError::InvalidArgument {
            function: call.name,
            message: format!("'{}' is not a unix timestamp", value::text(v).unwrap_or_default()),
        })?,
    };
    let local = Local
        .timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| FunctionError::InvalidArgument {
            function: call.name,
            message: format!("timestamp {} is out of range", ts),
        })?
        .naive_local();

    match call.opt_arg(1) {
        None => Ok(Value::Text(local.format(DATETIME_FORMAT).to_string())),
        Some(fmt) => Ok(value::text(fmt)
            .map(|fmt| Value::Text(format::render(&local, &fmt)))
            .unwrap_or(Value::Null)),
    }
}

pub fn date_format(call: &Call<'_>) -> Result<Value, FunctionError> {
    let Some(fmt) = value::text(call.arg(1)) else {
        return Ok(Value::Null);
    };
    Ok(match date_arg(call, 0)? {
        Some(DateValue::At(dt)) => Value::Text(format::render(&dt, &fmt)),
        None | Some(DateValue::Zero) => Value::Null,
    })
}

pub fn date_add(call: &Call<'_>) -> Result<Value, FunctionError> {
    shift(call, false)
}

pub fn date_sub(call: &Call<'_>) -> Result<Value, FunctionError> {
    shift(call, true)
}

fn shift(call: &Call<'_>, subtract: bool) -> Result<Value, FunctionError> {
    let (Some(date), Some(interval)) = (value::text(call.arg(0)), value::text(call.arg(1))) else {
        return Ok(Value::Null);
    };
    let interval = IntervalExpression::parse(&interval)?;

    // The rewriter passes the live-clock calls through as text.
    let (base, date_only) = match date.trim().to_lowercase().as_str() {
        "curdate()" => (Local::now().date_naive().and_time(NaiveTime::MIN), true),
        "now()" => (Local::now().naive_local(), false),
        _ => match parse_date_value(&date) {
            Some(DateValue::At(dt)) => (dt, false),
            Some(DateValue::Zero) => return Ok(Value::Null),
            None => return Err(invalid_date(call.name, &date)),
        },
    };

    let shifted = interval
        .apply(base, subtract)
        .ok_or_else(|| FunctionError::InvalidArgument {
            function: call.name,
            message: format!("'{}' shifted by {} is out of range", date, interval.unit),
        })?;
    let out = if date_only {
        shifted.format(DATE_FORMAT)
    } else {
        shifted.format(DATETIME_FORMAT)
    };
    Ok(Value::Text(out.to_string()))
}

/// Whole days from `end` to `start`: positive when `start` is later.
pub fn datediff(call: &Call<'_>) -> Result<Value, FunctionError> {
    let start = date_arg(call, 0)?;
    let end = date_arg(call, 1)?;
    Ok(match (start, end) {
        (Some(DateValue::At(s)), Some(DateValue::At(e))) => {
            Value::Integer(s.signed_duration_since(e).num_days())
        }
        _ => Value::Null,
    })
}
