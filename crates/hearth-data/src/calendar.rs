//! Month-start calendar helpers.
//!
//! Every normalized series is keyed by the first day of its month. Month arithmetic is
//! done on a linear month index (`year * 12 + month0`) so lookbacks and interpolation
//! distances never depend on month lengths.

use chrono::{Datelike, NaiveDate};

/// Snap a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Snap a date to the first day of its quarter (Jan, Apr, Jul, Oct).
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// First month of quarter `quarter` (1-4) in `year`.
pub fn quarter_month(year: i32, quarter: u32) -> Option<NaiveDate> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}

/// Linear month index of a date.
pub fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// Month-start date for a linear month index.
pub fn from_month_index(index: i32) -> Option<NaiveDate> {
    let year = index.div_euclid(12);
    let month0 = index.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// Shift a date by `months`, landing on a month start.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    from_month_index(month_index(date) + months)
}

/// Whole months from `from` to `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    month_index(to) - month_index(from)
}

/// Whether a column header looks like a period: starts with a digit and contains a
/// date separator.
pub fn is_period_header(header: &str) -> bool {
    header.chars().next().is_some_and(|c| c.is_ascii_digit())
        && (header.contains('-') || header.contains('/'))
}

/// Parse a period header or date cell.
///
/// Accepts `YYYY-MM-DD` (the monthly convention), `YYYY/MM/DD`, `MM/DD/YYYY` and
/// `YYYY-MM`. The day is kept; snapping to month start is the normalizer's job.
pub fn parse_period(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Datetime strings carry a time suffix after the date part.
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(&format!("{date_part}-01"), "%Y-%m-%d").ok()
}
