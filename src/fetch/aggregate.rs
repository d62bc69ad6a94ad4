//! Turns scraped days into per-year data and the trailing default window.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use super::scrape::ScrapedDay;
use crate::types::{Contribution, ContributionData, YearData};

/// Length of the rolling default window.
pub const DEFAULT_WINDOW_DAYS: i64 = 365;

/// Turn one year's scraped cells into a [`YearData`].
///
/// The total is the one GitHub reported when known, otherwise the sum of the
/// per-day counts.
pub fn build_year(year: i32, days: &[ScrapedDay], total_hint: Option<u32>) -> Option<YearData> {
    let (from, to) = YearData::calendar_bounds(year)?;
    let in_range: Vec<&ScrapedDay> = days.iter().filter(|d| d.date >= from && d.date <= to).collect();

    let total = total_hint.unwrap_or_else(|| in_range.iter().filter_map(|d| d.contribution_count()).sum());
    let contributions = in_range.into_iter().map(ScrapedDay::to_contribution).collect();

    Some(YearData::new(year, total, from, to, contributions))
}

/// The trailing window ending at the newest scraped day, or `today` when
/// nothing was scraped.
pub fn build_default(days: &[ScrapedDay], today: NaiveDate) -> Vec<Contribution> {
    let contributions: Vec<Contribution> = days.iter().map(ScrapedDay::to_contribution).collect();
    trailing_window(contributions, today)
}

/// Rebuild the default window from cached years.
pub fn default_from_years<'a>(years: impl IntoIterator<Item = &'a YearData>, today: NaiveDate) -> Vec<Contribution> {
    let contributions = years
        .into_iter()
        .flat_map(|y| y.contributions.iter().cloned())
        .filter(|c| c.date <= today)
        .collect();
    trailing_window(contributions, today)
}

fn trailing_window(contributions: Vec<Contribution>, today: NaiveDate) -> Vec<Contribution> {
    let end = contributions.iter().map(|c| c.date).max().unwrap_or(today);
    let start = end - Duration::days(DEFAULT_WINDOW_DAYS - 1);

    let mut by_date = BTreeMap::new();
    for contribution in contributions {
        if contribution.date >= start && contribution.date <= end {
            by_date.insert(contribution.date, contribution);
        }
    }
    by_date.into_values().collect()
}

/// Sum of the counts the window's tooltips state.
pub fn window_total(contributions: &[Contribution]) -> u32 {
    contributions.iter().filter_map(Contribution::count).sum()
}

impl ContributionData {
    /// Put the pieces of one load together.
    pub fn assemble(
        username: &str,
        mut available_years: Vec<i32>,
        years: impl IntoIterator<Item = YearData>,
        default_contributions: Vec<Contribution>,
        default_total: Option<u32>,
    ) -> Self {
        available_years.sort_unstable_by(|a, b| b.cmp(a));
        available_years.dedup();

        Self {
            username: username.to_string(),
            years: years.into_iter().map(|y| (y.year, y)).collect(),
            available_years,
            default_contributions,
            default_total,
        }
    }
}
