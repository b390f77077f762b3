//! Text normalization, season labels and small logging helpers.
//!
//! This module provides helper functions used throughout the crate:
//! - Whitespace and lookup-key normalization for every matching decision
//! - Season arithmetic for roster and team-stats URLs
//! - String truncation for log previews

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

static NON_KEY_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9 ]").expect("static regex"));

/// Collapse every run of whitespace into a single space and trim both ends.
///
/// Empty input yields an empty string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_whitespace("  Abdirasak \n\t Bulale "), "Abdirasak Bulale");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case `s` and strip every character outside `[a-z0-9 ]`.
///
/// Used for dictionary lookups that must ignore punctuation, so that
/// `"St. Olaf College"` and `"st olaf college"` land on the same key.
pub fn normalize_key(s: &str) -> String {
    NON_KEY_CHARS.replace_all(&s.to_lowercase(), "").into_owned()
}

/// Season arithmetic for fall sports.
///
/// A fall season that starts in August belongs to the calendar year it
/// starts in, so from July onward the "current" season is this year's;
/// before that it is last year's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCalendar {
    /// Start year of the most recent season.
    pub latest: i32,
}

impl SeasonCalendar {
    /// Calendar anchored on today's local date.
    #[instrument(level = "debug")]
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        let calendar = Self::for_date(today);
        tracing::debug!(%today, latest = calendar.latest, "Computed season calendar");
        calendar
    }

    pub fn for_date(date: NaiveDate) -> Self {
        let latest = if date.month() >= 7 {
            date.year()
        } else {
            date.year() - 1
        };
        Self { latest }
    }

    /// Split-year labels (`"2024-25"`) for the `count` seasons before the latest.
    pub fn prior_roster_labels(&self, count: usize) -> Vec<String> {
        (1..=count as i32)
            .map(|back| {
                let start = self.latest - back;
                format!("{}-{:02}", start, (start + 1).rem_euclid(100))
            })
            .collect()
    }

    /// Plain year labels (`"2024"`) for the `count` most recent seasons, newest first.
    pub fn recent_years(&self, count: usize) -> Vec<String> {
        (0..count as i32)
            .map(|back| (self.latest - back).to_string())
            .collect()
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(
            normalize_whitespace("  Abdirasak \n\t Bulale  "),
            "Abdirasak Bulale"
        );
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_normalize_whitespace_never_double_spaces() {
        let inputs = [
            "a  b",
            "\u{a0}Hometown:\u{a0}\u{a0}Minneapolis, Minn.",
            "   ",
            "x\r\n\r\ny",
            "single",
        ];
        for input in inputs {
            let out = normalize_whitespace(input);
            assert!(!out.contains("  "), "{out:?} has a double space");
            assert_eq!(out, out.trim(), "{out:?} is not trimmed");
        }
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("St. Olaf College"), "st olaf college");
        assert_eq!(normalize_key("Saint Mary's"), "saint marys");
        assert_eq!(normalize_key("Gustavus-Adolphus!"), "gustavusadolphus");
    }

    #[test]
    fn test_season_calendar_rolls_over_in_july() {
        let june = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let july = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(SeasonCalendar::for_date(june).latest, 2024);
        assert_eq!(SeasonCalendar::for_date(july).latest, 2025);
    }

    #[test]
    fn test_prior_roster_labels() {
        let calendar = SeasonCalendar { latest: 2025 };
        assert_eq!(calendar.prior_roster_labels(2), vec!["2024-25", "2023-24"]);

        let century = SeasonCalendar { latest: 2000 };
        assert_eq!(century.prior_roster_labels(1), vec!["1999-00"]);
    }

    #[test]
    fn test_recent_years() {
        let calendar = SeasonCalendar { latest: 2024 };
        assert_eq!(calendar.recent_years(3), vec!["2024", "2023", "2022"]);
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let result = truncate_for_log(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let s = "ééé";
        assert_eq!(truncate_for_log(s, 3), "é…(+4 bytes)");
    }
}
