use crate::common::error::DateParseError;
use chrono::{Datelike, Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

/// Raw `(year, month, day)` components before calendar normalization.
type Components = (i64, i64, i64);

/// One accepted spreadsheet date format.
struct DateFormat {
    name: &'static str,
    pattern: Regex,
    components: fn(&Captures<'_>, i32) -> Option<Components>,
}

/// Accepted formats in match order. Adding a format means adding an entry here.
/// Digits are ASCII only; `\d` would also admit other Unicode digits.
static DATE_FORMATS: Lazy<Vec<DateFormat>> = Lazy::new(|| {
    vec![
        DateFormat {
            name: "iso",
            pattern: Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid iso date pattern"),
            components: iso_components,
        },
        DateFormat {
            name: "slash",
            pattern: Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})(?:/([0-9]{2,4}))?$")
                .expect("valid slash date pattern"),
            components: slash_components,
        },
    ]
});

fn capture_number(caps: &Captures<'_>, index: usize) -> Option<i64> {
    caps.get(index)?.as_str().parse().ok()
}

fn iso_components(caps: &Captures<'_>, _current_year: i32) -> Option<Components> {
    Some((
        capture_number(caps, 1)?,
        capture_number(caps, 2)?,
        capture_number(caps, 3)?,
    ))
}

/// `M/D` takes the current year; a year below 100 is taken as `2000 + year`.
fn slash_components(caps: &Captures<'_>, current_year: i32) -> Option<Components> {
    let month = capture_number(caps, 1)?;
    let day = capture_number(caps, 2)?;
    let year = match caps.get(3) {
        None => i64::from(current_year),
        Some(_) => {
            let year = capture_number(caps, 3)?;
            if year < 100 {
                year + 2000
            } else {
                year
            }
        }
    };
    Some((year, month, day))
}

/// Builds a date from components, rolling overflowing months and days forward
/// (month 13 is January of the next year, day 0 is the last day of the
/// previous month).
fn rollover_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let total_months = year.checked_mul(12)?.checked_add(month - 1)?;
    let year = i32::try_from(total_months.div_euclid(12)).ok()?;
    let month = u32::try_from(total_months.rem_euclid(12) + 1).ok()?;
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    first_of_month.checked_add_signed(Duration::days(day - 1))
}

/// Parse a spreadsheet `date` cell, taking the local calendar year for `M/D`.
pub fn parse_csv_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    parse_csv_date_with_year(raw, Local::now().year())
}

/// Parse a spreadsheet `date` cell against an explicit "current year".
///
/// Accepts `YYYY-MM-DD`, `M/D` and `M/D/Y`. Surrounding whitespace is ignored.
pub fn parse_csv_date_with_year(raw: &str, current_year: i32) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }

    for format in DATE_FORMATS.iter() {
        let Some(caps) = format.pattern.captures(trimmed) else {
            continue;
        };
        trace!(format = format.name, value = trimmed, "date format matched");
        return (format.components)(&caps, current_year)
            .and_then(|(y, m, d)| rollover_date(y, m, d))
            .ok_or_else(|| DateParseError::OutOfRange(trimmed.to_string()));
    }

    Err(DateParseError::Unrecognized(trimmed.to_string()))
}
