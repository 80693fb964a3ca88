//! `INTERVAL <quantity> <unit>` parsing and application.

use crate::error::FunctionError;
use chrono::{Months, NaiveDateTime, TimeDelta};
use std::fmt;
use std::str::FromStr;

const KEYWORD: &str = "interval";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    MinuteSecond,
    HourSecond,
    HourMinute,
    DaySecond,
    DayMinute,
    DayHour,
    YearMonth,
}

impl IntervalUnit {
    pub const ALL: [IntervalUnit; 14] = [
        IntervalUnit::Second,
        IntervalUnit::Minute,
        IntervalUnit::Hour,
        IntervalUnit::Day,
        IntervalUnit::Week,
        IntervalUnit::Month,
        IntervalUnit::Year,
        IntervalUnit::MinuteSecond,
        IntervalUnit::HourSecond,
        IntervalUnit::HourMinute,
        IntervalUnit::DaySecond,
        IntervalUnit::DayMinute,
        IntervalUnit::DayHour,
        IntervalUnit::YearMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Second => "second",
            IntervalUnit::Minute => "minute",
            IntervalUnit::Hour => "hour",
            IntervalUnit::Day => "day",
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
            IntervalUnit::Year => "year",
            IntervalUnit::MinuteSecond => "minute_second",
            IntervalUnit::HourSecond => "hour_second",
            IntervalUnit::HourMinute => "hour_minute",
            IntervalUnit::DaySecond => "day_second",
            IntervalUnit::DayMinute => "day_minute",
            IntervalUnit::DayHour => "day_hour",
            IntervalUnit::YearMonth => "year_month",
        }
    }

    /// Number of components in the quantity; 1 for simple units.
    fn components(&self) -> usize {
        match self {
            IntervalUnit::DaySecond => 4,
            IntervalUnit::HourSecond | IntervalUnit::DayMinute => 3,
            IntervalUnit::MinuteSecond
            | IntervalUnit::HourMinute
            | IntervalUnit::DayHour
            | IntervalUnit::YearMonth => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntervalUnit::ALL
            .iter()
            .find(|unit| unit.as_str() == s)
            .copied()
            .ok_or(())
    }
}

/// Normalized amount of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalDuration {
    /// Fixed-length units, applied as an exact duration.
    Clock {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    /// Calendar units; month arithmetic clamps to the last valid day.
    Calendar { years: i64, months: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalExpression {
    pub unit: IntervalUnit,
    pub duration: IntervalDuration,
}

impl IntervalExpression {
    /// Parse `INTERVAL 1 DAY`, `interval '1:30' minute_second`, ...
    ///
    /// Units outside the supported set are an error.
    pub fn parse(text: &str) -> Result<Self, FunctionError> {
        let malformed = || FunctionError::MalformedInterval(text.to_string());

        let trimmed = text.trim();
        let keyword = trimmed.get(..KEYWORD.len()).ok_or_else(malformed)?;
        if !keyword.eq_ignore_ascii_case(KEYWORD) {
            return Err(malformed());
        }

        let tokens: Vec<&str> = trimmed[KEYWORD.len()..].split_whitespace().collect();
        let (unit_token, quantity_tokens) = match tokens.split_last() {
            Some((unit, quantity)) if !quantity.is_empty() => (unit, quantity),
            _ => return Err(malformed()),
        };
        let unit: IntervalUnit = unit_token
            .to_lowercase()
            .parse()
            .map_err(|_| malformed())?;

        let quantity = quantity_tokens.join(" ");
        let quantity = quantity.trim_matches(|c| c == '\'' || c == '"').trim();
        let (negative, body) = match quantity.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, quantity.strip_prefix('+').unwrap_or(quantity)),
        };

        let parts: Vec<i64> = body
            .split(|c: char| c == ':' || c == '-' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<i64>().map_err(|_| malformed()))
            .collect::<Result<_, _>>()?;

        if parts.is_empty() || parts.len() > unit.components() {
            return Err(malformed());
        }

        // Missing leading components count as zero: '5' DAY_HOUR is 5 hours.
        let mut padded = vec![0; unit.components() - parts.len()];
        padded.extend(parts);
        let sign = if negative { -1 } else { 1 };
        let c: Vec<i64> = padded.into_iter().map(|v| v * sign).collect();

        let clock = |days, hours, minutes, seconds| IntervalDuration::Clock {
            days,
            hours,
            minutes,
            seconds,
        };
        let duration = match unit {
            IntervalUnit::Second => clock(0, 0, 0, c[0]),
            IntervalUnit::Minute => clock(0, 0, c[0], 0),
            IntervalUnit::Hour => clock(0, c[0], 0, 0),
            IntervalUnit::Day => clock(c[0], 0, 0, 0),
            IntervalUnit::Week => clock(c[0].checked_mul(7).ok_or_else(malformed)?, 0, 0, 0),
            IntervalUnit::MinuteSecond => clock(0, 0, c[0], c[1]),
            IntervalUnit::HourSecond => clock(0, c[0], c[1], c[2]),
            IntervalUnit::HourMinute => clock(0, c[0], c[1], 0),
            IntervalUnit::DaySecond => clock(c[0], c[1], c[2], c[3]),
            IntervalUnit::DayMinute => clock(c[0], c[1], c[2], 0),
            IntervalUnit::DayHour => clock(c[0], c[1], 0, 0),
            IntervalUnit::Month => IntervalDuration::Calendar {
                years: 0,
                months: c[0],
            },
            IntervalUnit::Year => IntervalDuration::Calendar {
                years: c[0],
                months: 0,
            },
            IntervalUnit::YearMonth => IntervalDuration::Calendar {
                years: c[0],
                months: c[1],
            },
        };

        Ok(IntervalExpression { unit, duration })
    }

    /// Shift `base` forwards (`subtract == false`) or backwards.
    ///
    /// `None` when the result leaves chrono's supported range.
    pub fn apply(&self, base: NaiveDateTime, subtract: bool) -> Option<NaiveDateTime> {
        match self.duration {
            IntervalDuration::Clock {
                days,
                hours,
                minutes,
                seconds,
            } => {
                let delta = TimeDelta::try_days(days)?
                    .checked_add(&TimeDelta::try_hours(hours)?)?
                    .checked_add(&TimeDelta::try_minutes(minutes)?)?
                    .checked_add(&TimeDelta::try_seconds(seconds)?)?;
                if subtract {
                    base.checked_sub_signed(delta)
                } else {
                    base.checked_add_signed(delta)
                }
            }
            IntervalDuration::Calendar { years, months } => {
                let mut total = years.checked_mul(12)?.checked_add(months)?;
                if subtract {
                    total = total.checked_neg()?;
                }
                let step = Months::new(u32::try_from(total.unsigned_abs()).ok()?);
                if total >= 0 {
                    base.checked_add_months(step)
                } else {
                    base.checked_sub_months(step)
                }
            }
        }
    }
}
