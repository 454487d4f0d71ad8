//! Query window for occurrence generation and reports.

use chrono::NaiveDate;
use serde::Serialize;

use crate::date::{month_end, month_start, parse_iso_date};
use crate::error::{MaintCalError, MaintCalResult};

/// Inclusive `[start, end]` date window. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> MaintCalResult<Self> {
        if start > end {
            return Err(MaintCalError::InvalidWindow { start, end });
        }
        Ok(DateWindow { start, end })
    }

    /// The calendar month containing `today`.
    pub fn current_month(today: NaiveDate) -> Self {
        DateWindow {
            start: month_start(today),
            end: month_end(today),
        }
    }

    /// Build a window from request arguments.
    /// - `start`, `end`: YYYY-MM-DD
    /// - a missing bound defaults to the corresponding edge of `today`'s month
    pub fn from_args(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> MaintCalResult<Self> {
        let month = Self::current_month(today);

        let start = match start {
            Some(s) => parse_window_date(s)?,
            None => month.start,
        };

        let end = match end {
            Some(s) => parse_window_date(s)?,
            None => month.end,
        };

        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_window_date(s: &str) -> MaintCalResult<NaiveDate> {
    parse_iso_date(s.trim()).ok_or_else(|| MaintCalError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_window() {
        let err = DateWindow::new(d("2025-02-01"), d("2025-01-31")).unwrap_err();
        assert!(matches!(err, MaintCalError::InvalidWindow { .. }));
    }

    #[test]
    fn test_single_day_window_is_valid() {
        let window = DateWindow::new(d("2025-02-01"), d("2025-02-01")).unwrap();
        assert!(window.contains(d("2025-02-01")));
        assert!(!window.contains(d("2025-02-02")));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = DateWindow::new(d("2025-01-01"), d("2025-01-31")).unwrap();
        assert!(window.contains(d("2025-01-01")));
        assert!(window.contains(d("2025-01-31")));
        assert!(!window.contains(d("2024-12-31")));
        assert!(!window.contains(d("2025-02-01")));
    }

    #[test]
    fn test_from_args_defaults_to_current_month() {
        let window = DateWindow::from_args(None, None, d("2024-02-17")).unwrap();
        assert_eq!(window.start(), d("2024-02-01"));
        assert_eq!(window.end(), d("2024-02-29"));
    }

    #[test]
    fn test_from_args_fills_only_missing_bound() {
        let window = DateWindow::from_args(Some("2024-01-15"), None, d("2024-02-17")).unwrap();
        assert_eq!(window.start(), d("2024-01-15"));
        assert_eq!(window.end(), d("2024-02-29"));
    }

    #[test]
    fn test_from_args_rejects_bad_dates() {
        let err = DateWindow::from_args(Some("2024-02-30"), None, d("2024-02-17")).unwrap_err();
        assert!(matches!(err, MaintCalError::InvalidDate(s) if s == "2024-02-30"));

        let err = DateWindow::from_args(None, Some("next week"), d("2024-02-17")).unwrap_err();
        assert!(matches!(err, MaintCalError::InvalidDate(_)));
    }

    #[test]
    fn test_from_args_rejects_inverted_bounds() {
        let err = DateWindow::from_args(Some("2024-03-01"), None, d("2024-02-17")).unwrap_err();
        assert!(matches!(err, MaintCalError::InvalidWindow { .. }));
    }
}
