//! MySQL `DATE_FORMAT()` specifiers rendered with chrono.
//!
//! Each `%x` token is translated on its own and rendered through a constant
//! chrono format, so user text never reaches chrono's format parser.

use chrono::{Datelike, NaiveDateTime};
use std::fmt::Write;

/// MySQL specifier character -> chrono format string.
///
/// `%D` (ordinal day) and `%%` are handled by [`render`] directly.
pub static DATE_FORMAT_MAP: &[(char, &str)] = &[
    ('a', "%a"),
    ('b', "%b"),
    ('c', "%-m"),
    ('d', "%d"),
    ('e', "%-d"),
    ('f', "%6f"),
    ('H', "%H"),
    ('h', "%I"),
    ('I', "%I"),
    ('i', "%M"),
    ('j', "%j"),
    ('k', "%-H"),
    ('l', "%-I"),
    ('M', "%B"),
    ('m', "%m"),
    ('p', "%p"),
    ('r', "%I:%M:%S %p"),
    ('S', "%S"),
    ('s', "%S"),
    ('T', "%H:%M:%S"),
    ('U', "%U"),
    ('u', "%W"),
    ('V', "%U"),
    ('v', "%V"),
    ('W', "%A"),
    ('w', "%w"),
    ('X', "%Y"),
    ('x', "%G"),
    ('Y', "%Y"),
    ('y', "%y"),
];

pub fn lookup(spec: char) -> Option<&'static str> {
    DATE_FORMAT_MAP
        .iter()
        .find(|(c, _)| *c == spec)
        .map(|(_, chrono_fmt)| *chrono_fmt)
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Format `dt` according to a MySQL format string.
///
/// Unknown specifiers are copied through unchanged, `%` included.
pub fn render(dt: &NaiveDateTime, format: &str) -> String {
    let mut out = String::with_capacity(format.len() + 8);
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => out.push('%'),
            Some('%') => out.push('%'),
            Some('D') => {
                let day = dt.day();
                let _ = write!(out, "{}{}", day, ordinal_suffix(day));
            }
            Some(spec) => match lookup(spec) {
                Some(chrono_fmt) => {
                    let _ = write!(out, "{}", dt.format(chrono_fmt));
                }
                None => {
                    out.push('%');
                    out.push(spec);
                }
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_micro_opt(14, 7, 9, 120)
            .unwrap()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(render(&dt(), "%Y-%m-%d"), "2024-03-05");
        assert_eq!(render(&dt(), "%H:%i:%s"), "14:07:09");
        assert_eq!(render(&dt(), "%T"), "14:07:09");
        assert_eq!(render(&dt(), "%r"), "02:07:09 PM");
    }

    #[test]
    fn test_names_and_unpadded() {
        assert_eq!(render(&dt(), "%W, %M %e"), "Tuesday, March 5");
        assert_eq!(render(&dt(), "%a %b %c"), "Tue Mar 3");
        assert_eq!(render(&dt(), "%k %l %p"), "14 2 PM");
        assert_eq!(render(&dt(), "%j"), "065");
        assert_eq!(render(&dt(), "%f"), "000120");
        assert_eq!(render(&dt(), "%y"), "24");
    }

    #[test]
    fn test_ordinal_day() {
        let on = |d| {
            render(
                &NaiveDate::from_ymd_opt(2024, 1, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                "%D",
            )
        };
        assert_eq!(on(1), "1st");
        assert_eq!(on(2), "2nd");
        assert_eq!(on(3), "3rd");
        assert_eq!(on(4), "4th");
        assert_eq!(on(11), "11th");
        assert_eq!(on(12), "12th");
        assert_eq!(on(13), "13th");
        assert_eq!(on(22), "22nd");
        assert_eq!(on(31), "31st");
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        assert_eq!(render(&dt(), "%Q|%Y"), "%Q|2024");
        assert_eq!(render(&dt(), "100%%"), "100%");
        assert_eq!(render(&dt(), "trailing %"), "trailing %");
        assert_eq!(render(&dt(), "literal text"), "literal text");
    }
}
