//! Recurrence rules for maintenance obligations.
//!
//! A rule is one of a fixed set of intervals. Week-based rules step by days,
//! everything else steps by calendar months with end-of-month clamping.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{add_days, add_months};

/// How often an obligation comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrenceRule {
    Weekly,
    BiWeekly,
    Monthly,
    BiMonthly,
    Quarterly,
    SemiAnnual,
    Annual,
    BiAnnual,
}

/// The size of one step of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Days(i64),
    Months(i32),
}

/// How forgiving rule parsing should be.
///
/// `Strict` is for values coming from a constrained selector (PM entry) and
/// only accepts canonical tokens. `Lenient` is for free-text fields such as a
/// calibration frequency typed by a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    Lenient,
}

/// Free-text spellings accepted in lenient mode, after normalization.
const ALIASES: &[(&str, RecurrenceRule)] = &[
    ("week", RecurrenceRule::Weekly),
    ("every-week", RecurrenceRule::Weekly),
    ("every-1-week", RecurrenceRule::Weekly),
    ("1-week", RecurrenceRule::Weekly),
    ("biweekly", RecurrenceRule::BiWeekly),
    ("fortnightly", RecurrenceRule::BiWeekly),
    ("every-2-weeks", RecurrenceRule::BiWeekly),
    ("every-other-week", RecurrenceRule::BiWeekly),
    ("2-weeks", RecurrenceRule::BiWeekly),
    ("month", RecurrenceRule::Monthly),
    ("every-month", RecurrenceRule::Monthly),
    ("every-1-month", RecurrenceRule::Monthly),
    ("1-month", RecurrenceRule::Monthly),
    ("bimonthly", RecurrenceRule::BiMonthly),
    ("every-2-months", RecurrenceRule::BiMonthly),
    ("every-other-month", RecurrenceRule::BiMonthly),
    ("2-months", RecurrenceRule::BiMonthly),
    ("quarter", RecurrenceRule::Quarterly),
    ("every-quarter", RecurrenceRule::Quarterly),
    ("every-3-months", RecurrenceRule::Quarterly),
    ("3-months", RecurrenceRule::Quarterly),
    ("semiannual", RecurrenceRule::SemiAnnual),
    ("semi-annually", RecurrenceRule::SemiAnnual),
    ("semiannually", RecurrenceRule::SemiAnnual),
    ("half-yearly", RecurrenceRule::SemiAnnual),
    ("twice-a-year", RecurrenceRule::SemiAnnual),
    ("every-6-months", RecurrenceRule::SemiAnnual),
    ("6-months", RecurrenceRule::SemiAnnual),
    ("annually", RecurrenceRule::Annual),
    ("yearly", RecurrenceRule::Annual),
    ("year", RecurrenceRule::Annual),
    ("every-year", RecurrenceRule::Annual),
    ("every-1-year", RecurrenceRule::Annual),
    ("every-12-months", RecurrenceRule::Annual),
    ("12-months", RecurrenceRule::Annual),
    ("1-year", RecurrenceRule::Annual),
    ("biannual", RecurrenceRule::BiAnnual),
    ("bi-annually", RecurrenceRule::BiAnnual),
    ("biennial", RecurrenceRule::BiAnnual),
    ("biennially", RecurrenceRule::BiAnnual),
    ("every-2-years", RecurrenceRule::BiAnnual),
    ("every-other-year", RecurrenceRule::BiAnnual),
    ("every-24-months", RecurrenceRule::BiAnnual),
    ("24-months", RecurrenceRule::BiAnnual),
    ("2-years", RecurrenceRule::BiAnnual),
];

impl RecurrenceRule {
    pub const ALL: [RecurrenceRule; 8] = [
        RecurrenceRule::Weekly,
        RecurrenceRule::BiWeekly,
        RecurrenceRule::Monthly,
        RecurrenceRule::BiMonthly,
        RecurrenceRule::Quarterly,
        RecurrenceRule::SemiAnnual,
        RecurrenceRule::Annual,
        RecurrenceRule::BiAnnual,
    ];

    /// Canonical token, as stored and as accepted by strict parsing.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceRule::Weekly => "weekly",
            RecurrenceRule::BiWeekly => "bi-weekly",
            RecurrenceRule::Monthly => "monthly",
            RecurrenceRule::BiMonthly => "bi-monthly",
            RecurrenceRule::Quarterly => "quarterly",
            RecurrenceRule::SemiAnnual => "semi-annual",
            RecurrenceRule::Annual => "annual",
            RecurrenceRule::BiAnnual => "bi-annual",
        }
    }

    /// Human-readable description for feeds and reports.
    pub fn label(&self) -> &'static str {
        match self {
            RecurrenceRule::Weekly => "Every week",
            RecurrenceRule::BiWeekly => "Every 2 weeks",
            RecurrenceRule::Monthly => "Every month",
            RecurrenceRule::BiMonthly => "Every 2 months",
            RecurrenceRule::Quarterly => "Every 3 months",
            RecurrenceRule::SemiAnnual => "Every 6 months",
            RecurrenceRule::Annual => "Every year",
            RecurrenceRule::BiAnnual => "Every 2 years",
        }
    }

    pub fn interval(&self) -> Interval {
        match self {
            RecurrenceRule::Weekly => Interval::Days(7),
            RecurrenceRule::BiWeekly => Interval::Days(14),
            RecurrenceRule::Monthly => Interval::Months(1),
            RecurrenceRule::BiMonthly => Interval::Months(2),
            RecurrenceRule::Quarterly => Interval::Months(3),
            RecurrenceRule::SemiAnnual => Interval::Months(6),
            RecurrenceRule::Annual => Interval::Months(12),
            RecurrenceRule::BiAnnual => Interval::Months(24),
        }
    }

    /// Parse a rule. Unrecognized input is `None`, never an error: callers
    /// treat it as a non-recurring obligation.
    pub fn parse(value: &str, mode: ParseMode) -> Option<Self> {
        match mode {
            ParseMode::Strict => Self::from_token(value),
            ParseMode::Lenient => {
                let normalized = normalize(value);
                Self::from_token(&normalized).or_else(|| {
                    ALIASES
                        .iter()
                        .find(|(alias, _)| *alias == normalized)
                        .map(|(_, rule)| *rule)
                })
            }
        }
    }

    pub fn parse_strict(value: &str) -> Option<Self> {
        Self::parse(value, ParseMode::Strict)
    }

    pub fn parse_lenient(value: &str) -> Option<Self> {
        Self::parse(value, ParseMode::Lenient)
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.as_str() == token)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The due date one step after `date`.
pub fn next_occurrence(date: NaiveDate, rule: RecurrenceRule) -> NaiveDate {
    match rule.interval() {
        Interval::Days(n) => add_days(date, n),
        Interval::Months(n) => add_months(date, n),
    }
}

/// Lowercase, turn whitespace and underscores into hyphens, and squeeze runs
/// of hyphens so "Every  2_Weeks" and "every-2-weeks" compare equal.
fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());

    for c in value.trim().to_lowercase().chars() {
        let c = if c.is_whitespace() || c == '_' { '-' } else { c };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }

    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_iso_date;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    #[test]
    fn test_next_occurrence_day_rules() {
        assert_eq!(next_occurrence(d("2025-01-01"), RecurrenceRule::Weekly), d("2025-01-08"));
        assert_eq!(next_occurrence(d("2025-12-25"), RecurrenceRule::BiWeekly), d("2026-01-08"));
    }

    #[test]
    fn test_next_occurrence_month_rules() {
        let start = d("2024-01-31");
        assert_eq!(next_occurrence(start, RecurrenceRule::Monthly), d("2024-02-29"));
        assert_eq!(next_occurrence(start, RecurrenceRule::BiMonthly), d("2024-03-31"));
        assert_eq!(next_occurrence(start, RecurrenceRule::Quarterly), d("2024-04-30"));
        assert_eq!(next_occurrence(start, RecurrenceRule::SemiAnnual), d("2024-07-31"));
        assert_eq!(next_occurrence(start, RecurrenceRule::Annual), d("2025-01-31"));
        assert_eq!(next_occurrence(start, RecurrenceRule::BiAnnual), d("2026-01-31"));
    }

    #[test]
    fn test_next_occurrence_always_advances() {
        for rule in RecurrenceRule::ALL {
            let date = d("2024-02-29");
            assert!(next_occurrence(date, rule) > date, "{rule} did not advance");
        }
    }

    #[test]
    fn test_parse_strict_accepts_canonical_tokens_only() {
        for rule in RecurrenceRule::ALL {
            assert_eq!(RecurrenceRule::parse_strict(rule.as_str()), Some(rule));
        }
        assert_eq!(RecurrenceRule::parse_strict("Weekly"), None);
        assert_eq!(RecurrenceRule::parse_strict("annually"), None);
        assert_eq!(RecurrenceRule::parse_strict("every-2-weeks"), None);
        assert_eq!(RecurrenceRule::parse_strict(" monthly"), None);
    }

    #[test]
    fn test_parse_lenient_normalizes_case_and_separators() {
        assert_eq!(RecurrenceRule::parse_lenient("Semi Annual"), Some(RecurrenceRule::SemiAnnual));
        assert_eq!(RecurrenceRule::parse_lenient("semi_annual"), Some(RecurrenceRule::SemiAnnual));
        assert_eq!(RecurrenceRule::parse_lenient("SEMI--ANNUAL"), Some(RecurrenceRule::SemiAnnual));
        assert_eq!(RecurrenceRule::parse_lenient("  Bi-Weekly "), Some(RecurrenceRule::BiWeekly));
        assert_eq!(RecurrenceRule::parse_lenient("Every 2 Weeks"), Some(RecurrenceRule::BiWeekly));
    }

    #[test]
    fn test_parse_lenient_aliases() {
        assert_eq!(RecurrenceRule::parse_lenient("annual"), Some(RecurrenceRule::Annual));
        assert_eq!(RecurrenceRule::parse_lenient("Annually"), Some(RecurrenceRule::Annual));
        assert_eq!(RecurrenceRule::parse_lenient("every year"), Some(RecurrenceRule::Annual));
        assert_eq!(RecurrenceRule::parse_lenient("biennial"), Some(RecurrenceRule::BiAnnual));
        assert_eq!(RecurrenceRule::parse_lenient("every-2-years"), Some(RecurrenceRule::BiAnnual));
        assert_eq!(RecurrenceRule::parse_lenient("quarter"), Some(RecurrenceRule::Quarterly));
        assert_eq!(RecurrenceRule::parse_lenient("every 6 months"), Some(RecurrenceRule::SemiAnnual));
    }

    #[test]
    fn test_parse_lenient_unknown_is_none() {
        assert_eq!(RecurrenceRule::parse_lenient(""), None);
        assert_eq!(RecurrenceRule::parse_lenient("whenever"), None);
        assert_eq!(RecurrenceRule::parse_lenient("every 5 weeks"), None);
    }

    #[test]
    fn test_serde_uses_canonical_tokens() {
        let json = serde_json::to_string(&RecurrenceRule::SemiAnnual).unwrap();
        assert_eq!(json, "\"semi-annual\"");
        let rule: RecurrenceRule = serde_json::from_str("\"bi-weekly\"").unwrap();
        assert_eq!(rule, RecurrenceRule::BiWeekly);
    }
}
