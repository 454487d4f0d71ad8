//! Calendar arithmetic on naive dates.
//!
//! Everything here works on `NaiveDate`: no time of day, no timezone.
//! Results that would fall outside chrono's representable range saturate
//! to `NaiveDate::MIN` / `NaiveDate::MAX` instead of panicking.

use chrono::{Datelike, Days, NaiveDate};

/// Parse a strict `YYYY-MM-DD` date.
///
/// Anything that isn't exactly ten characters of zero-padded digits with `-`
/// separators, or that names a day the calendar doesn't have (`2024-02-30`),
/// returns `None`.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }

    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a date as zero-padded `YYYY-MM-DD`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Add (or subtract, for negative `n`) whole days.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let shifted = if n >= 0 {
        date.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(n.unsigned_abs()))
    };

    shifted.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Add (or subtract) calendar months, keeping the day of month where the
/// target month has it and clamping to its last day otherwise.
///
/// `2024-01-31 + 1 month = 2024-02-29`, `2023-01-31 + 1 month = 2023-02-28`.
pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(n);
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    let Ok(year) = i32::try_from(year) else {
        return if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN };
    };

    let day = date.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Number of days in the given month (1-based).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year.saturating_add(1), 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}
