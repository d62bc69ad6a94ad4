//! # Common Types
//!
//! This module contains the types shared across the application for
//! representing scraped contribution calendars and caching them.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest intensity GitHub assigns to a day.
pub const MAX_LEVEL: u8 = 4;

static COUNT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([\d,]+)\s+contributions?").expect("invalid regex"));

/// Clamp a raw intensity value into `0..=4`.
pub fn clamp_level(raw: i64) -> u8 {
    raw.clamp(0, MAX_LEVEL as i64) as u8
}

/// A key used for caching one year of contributions for one user.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CacheKey {
    /// GitHub login, lowercased
    pub username: String,
    /// Calendar year
    pub year: i32,
}

impl CacheKey {
    pub fn new(username: &str, year: i32) -> Self {
        Self {
            username: username.to_ascii_lowercase(),
            year,
        }
    }
}

/// One calendar day on a contribution graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contribution {
    /// The day, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Intensity, always within `0..=4`
    pub level: u8,
    /// Human readable tooltip, e.g. "3 contributions on March 2nd."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl Contribution {
    pub fn new(date: NaiveDate, level: i64, tooltip: Option<String>) -> Self {
        Self {
            date,
            level: clamp_level(level),
            tooltip,
        }
    }

    /// Number of contributions stated by the tooltip.
    ///
    /// Returns `None` when there is no tooltip or it does not state a count.
    pub fn count(&self) -> Option<u32> {
        let tooltip = self.tooltip.as_deref()?;
        if tooltip.trim_start().starts_with("No contributions") {
            return Some(0);
        }
        COUNT_REGEX
            .captures(tooltip)
            .and_then(|caps| caps[1].replace(',', "").parse().ok())
    }
}

/// One year of contributions as GitHub scopes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearData {
    /// The year label
    pub year: i32,
    /// Total contributions GitHub reports for the range
    pub total: u32,
    /// First day of the range
    pub from: NaiveDate,
    /// Last day of the range
    pub to: NaiveDate,
    /// Days ordered by date, all within `from..=to`
    pub contributions: Vec<Contribution>,
}

impl YearData {
    /// Build a year, keeping only days inside `from..=to`.
    ///
    /// Days are sorted by date and deduplicated; the last occurrence of a
    /// date wins.
    pub fn new(year: i32, total: u32, from: NaiveDate, to: NaiveDate, contributions: Vec<Contribution>) -> Self {
        let mut by_date = BTreeMap::new();
        for contribution in contributions {
            if contribution.date >= from && contribution.date <= to {
                by_date.insert(contribution.date, contribution);
            }
        }

        Self {
            year,
            total,
            from,
            to,
            contributions: by_date.into_values().collect(),
        }
    }

    /// `January 1st ..= December 31st` of `year`.
    pub fn calendar_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
        Some((NaiveDate::from_ymd_opt(year, 1, 1)?, NaiveDate::from_ymd_opt(year, 12, 31)?))
    }

    /// Whether every day lies within the declared range.
    pub fn is_consistent(&self) -> bool {
        self.contributions
            .iter()
            .all(|c| c.date >= self.from && c.date <= self.to && c.date.year() == self.year)
    }
}

/// Everything known about one user's calendar, ready for presentation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContributionData {
    /// GitHub login
    pub username: String,
    /// Years with loaded data
    pub years: BTreeMap<i32, YearData>,
    /// Years the profile offers, newest first
    pub available_years: Vec<i32>,
    /// The rolling last-year window
    pub default_contributions: Vec<Contribution>,
    /// Total reported for the rolling window
    pub default_total: Option<u32>,
}

impl ContributionData {
    pub fn year(&self, year: i32) -> Option<&YearData> {
        self.years.get(&year)
    }

    /// Every loaded year merged into one ascending list.
    pub fn all_contributions(&self) -> Vec<Contribution> {
        let mut by_date = BTreeMap::new();
        for year in self.years.values() {
            for contribution in &year.contributions {
                by_date.insert(contribution.date, contribution.clone());
            }
        }
        by_date.into_values().collect()
    }

    /// Sum of the totals of every loaded year.
    pub fn all_total(&self) -> u32 {
        self.years.values().map(|y| y.total).sum()
    }

    /// Merge freshly loaded data into this set, keeping years already present.
    pub fn merge(&mut self, other: ContributionData) {
        if !self.username.eq_ignore_ascii_case(&other.username) {
            *self = other;
            return;
        }
        self.years.extend(other.years);
        if !other.available_years.is_empty() {
            self.available_years = other.available_years;
        }
        if !other.default_contributions.is_empty() {
            self.default_contributions = other.default_contributions;
            self.default_total = other.default_total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_level_clamping() {
        assert_eq!(clamp_level(-3), 0);
        assert_eq!(clamp_level(0), 0);
        assert_eq!(clamp_level(3), 3);
        assert_eq!(clamp_level(4), 4);
        assert_eq!(clamp_level(17), 4);
        assert_eq!(Contribution::new(day("2024-01-01"), 9, None).level, 4);
    }

    #[test]
    fn test_count_from_tooltip() {
        let with = |t: &str| Contribution::new(day("2024-01-01"), 1, Some(t.to_string())).count();
        assert_eq!(with("No contributions on January 1st."), Some(0));
        assert_eq!(with("1 contribution on January 1st."), Some(1));
        assert_eq!(with("1,204 contributions on January 1st."), Some(1204));
        assert_eq!(with("Something else"), None);
        assert_eq!(Contribution::new(day("2024-01-01"), 1, None).count(), None);
    }

    #[test]
    fn test_year_drops_out_of_range_days() {
        let (from, to) = YearData::calendar_bounds(2023).unwrap();
        let year = YearData::new(
            2023,
            5,
            from,
            to,
            vec![
                Contribution::new(day("2023-03-01"), 2, None),
                Contribution::new(day("2022-12-31"), 1, None),
                Contribution::new(day("2023-01-01"), 1, None),
                Contribution::new(day("2024-01-01"), 4, None),
                Contribution::new(day("2023-03-01"), 3, None),
            ],
        );

        let dates: Vec<_> = year.contributions.iter().map(|c| c.date.to_string()).collect();
        assert_eq!(dates, vec!["2023-01-01", "2023-03-01"]);
        assert_eq!(year.contributions[1].level, 3);
        assert!(year.is_consistent());
    }

    #[test]
    fn test_all_contributions_merges_years() {
        let mut data = ContributionData::default();
        for y in [2022, 2023] {
            let (from, to) = YearData::calendar_bounds(y).unwrap();
            data.years.insert(
                y,
                YearData::new(y, 1, from, to, vec![Contribution::new(day(&format!("{y}-06-01")), 1, None)]),
            );
        }

        let all = data.all_contributions();
        assert_eq!(all.len(), 2);
        assert!(all[0].date < all[1].date);
        assert_eq!(data.all_total(), 2);
    }

    #[test]
    fn test_serialized_date_is_iso() {
        let c = Contribution::new(day("2024-02-29"), 2, None);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"date":"2024-02-29","level":2}"#);
    }

    #[test]
    fn test_cache_key_is_case_insensitive() {
        assert_eq!(CacheKey::new("OctoCat", 2024), CacheKey::new("octocat", 2024));
        assert_ne!(CacheKey::new("octocat", 2023), CacheKey::new("octocat", 2024));
    }
}
