//! Which part of a user's history is on screen.
//!
//! The selection decides both what must be loaded and how the calendar is
//! laid out: the rolling default window uses a fixed 53-week grid, while a
//! single year or the whole history spans from the first day to the last.

use serde::{Deserialize, Serialize};

use crate::layout::RangeMode;
use crate::types::{Contribution, ContributionData};

/// The three kinds of selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "year", rename_all = "snake_case")]
pub enum YearSelection {
    /// The trailing year GitHub shows by default
    #[default]
    Default,
    /// Every year the profile offers
    All,
    /// One calendar year
    Year(i32),
}

/// What a load for a selection has to do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadPlan {
    /// Fetch the trailing-year calendar
    pub default: bool,
    /// Years to fetch from the network
    pub fetch: Vec<i32>,
    /// Years that can be served from the cache
    pub cached: Vec<i32>,
}

impl LoadPlan {
    pub fn is_empty(&self) -> bool {
        !self.default && self.fetch.is_empty() && self.cached.is_empty()
    }
}

/// Work out what `selection` needs.
///
/// Past years found in `cached` are read from the cache. The current year is
/// always fetched again since it is still changing.
pub fn plan(selection: YearSelection, available: &[i32], cached: &[i32], current_year: i32) -> LoadPlan {
    let wanted: Vec<i32> = match selection {
        YearSelection::Default => Vec::new(),
        YearSelection::All => available.to_vec(),
        YearSelection::Year(year) => vec![year],
    };

    let mut plan = LoadPlan {
        default: selection == YearSelection::Default,
        ..LoadPlan::default()
    };

    for year in wanted {
        if year != current_year && cached.contains(&year) {
            plan.cached.push(year);
        } else {
            plan.fetch.push(year);
        }
    }
    plan
}

/// Restore a saved selection against the years the profile actually has.
pub fn resolve(saved: YearSelection, available: &[i32]) -> YearSelection {
    match saved {
        YearSelection::Year(year) if !available.contains(&year) => YearSelection::Default,
        other => other,
    }
}

/// Entries for the selection menu: Default, All, then each year newest first.
pub fn options(available: &[i32]) -> Vec<YearSelection> {
    let mut years = available.to_vec();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();

    let mut options = vec![YearSelection::Default, YearSelection::All];
    options.extend(years.into_iter().map(YearSelection::Year));
    options
}

/// The slice of data a selection shows.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionView {
    pub contributions: Vec<Contribution>,
    pub mode: RangeMode,
    pub total: Option<u32>,
}

/// Pick the contributions, range mode and total for `selection`.
///
/// Returns `None` when the data it needs has not been loaded yet.
pub fn view(selection: YearSelection, data: &ContributionData) -> Option<SelectionView> {
    match selection {
        YearSelection::Default => {
            if data.default_contributions.is_empty() {
                return None;
            }
            Some(SelectionView {
                contributions: data.default_contributions.clone(),
                mode: RangeMode::TrailingWeeks,
                total: data.default_total,
            })
        }
        YearSelection::All => {
            if data.years.is_empty() {
                return None;
            }
            Some(SelectionView {
                contributions: data.all_contributions(),
                mode: RangeMode::FullRange,
                total: Some(data.all_total()),
            })
        }
        YearSelection::Year(year) => data.year(year).map(|y| SelectionView {
            contributions: y.contributions.clone(),
            mode: RangeMode::FullRange,
            total: Some(y.total),
        }),
    }
}

impl ContributionData {
    /// The total shown for `selection`, if its data is loaded.
    pub fn total_for(&self, selection: YearSelection) -> Option<u32> {
        match selection {
            YearSelection::Default => self.default_total,
            YearSelection::All => (!self.years.is_empty()).then(|| self.all_total()),
            YearSelection::Year(year) => self.year(year).map(|y| y.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::YearData;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_plan_fetches_only_window() {
        let plan = plan(YearSelection::Default, &[2024, 2023], &[2023], 2024);
        assert_eq!(
            plan,
            LoadPlan {
                default: true,
                fetch: vec![],
                cached: vec![]
            }
        );
    }

    #[test]
    fn test_year_plan_prefers_cache_for_past_years() {
        assert_eq!(plan(YearSelection::Year(2022), &[2024, 2022], &[2022], 2024).cached, vec![2022]);
        assert_eq!(plan(YearSelection::Year(2022), &[2024, 2022], &[], 2024).fetch, vec![2022]);
    }

    #[test]
    fn test_current_year_is_always_fetched() {
        let plan = plan(YearSelection::Year(2024), &[2024], &[2024], 2024);
        assert_eq!(plan.fetch, vec![2024]);
        assert!(plan.cached.is_empty());
    }

    #[test]
    fn test_all_plan_covers_every_year() {
        let plan = plan(YearSelection::All, &[2024, 2023, 2022], &[2022], 2024);
        assert!(!plan.default);
        assert_eq!(plan.fetch, vec![2024, 2023]);
        assert_eq!(plan.cached, vec![2022]);
    }

    #[test]
    fn test_resolve_drops_unknown_year() {
        assert_eq!(resolve(YearSelection::Year(2019), &[2024, 2023]), YearSelection::Default);
        assert_eq!(resolve(YearSelection::Year(2023), &[2024, 2023]), YearSelection::Year(2023));
        assert_eq!(resolve(YearSelection::All, &[]), YearSelection::All);
    }

    #[test]
    fn test_options_order() {
        assert_eq!(
            options(&[2022, 2024, 2023]),
            vec![
                YearSelection::Default,
                YearSelection::All,
                YearSelection::Year(2024),
                YearSelection::Year(2023),
                YearSelection::Year(2022),
            ]
        );
    }

    #[test]
    fn test_view_modes() {
        let (from, to) = YearData::calendar_bounds(2023).unwrap();
        let day = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        let mut data = ContributionData::default();
        data.years.insert(
            2023,
            YearData::new(2023, 9, from, to, vec![Contribution::new(day, 2, None)]),
        );

        assert!(view(YearSelection::Default, &data).is_none());
        assert!(view(YearSelection::Year(2022), &data).is_none());

        let year = view(YearSelection::Year(2023), &data).unwrap();
        assert_eq!(year.mode, RangeMode::FullRange);
        assert_eq!(year.total, Some(9));

        data.default_contributions = vec![Contribution::new(day, 2, None)];
        assert_eq!(view(YearSelection::Default, &data).unwrap().mode, RangeMode::TrailingWeeks);
    }

    #[test]
    fn test_total_for_selection() {
        let (from, to) = YearData::calendar_bounds(2022).unwrap();
        let mut data = ContributionData::default();
        assert_eq!(data.total_for(YearSelection::All), None);

        data.years.insert(2022, YearData::new(2022, 5, from, to, vec![]));
        let (from, to) = YearData::calendar_bounds(2023).unwrap();
        data.years.insert(2023, YearData::new(2023, 7, from, to, vec![]));
        data.default_total = Some(6);

        assert_eq!(data.total_for(YearSelection::Default), Some(6));
        assert_eq!(data.total_for(YearSelection::All), Some(12));
        assert_eq!(data.total_for(YearSelection::Year(2023)), Some(7));
        assert_eq!(data.total_for(YearSelection::Year(2019)), None);
    }

    #[test]
    fn test_selection_serialization() {
        assert_eq!(serde_json::to_string(&YearSelection::Year(2021)).unwrap(), r#"{"kind":"year","year":2021}"#);
        assert_eq!(serde_json::to_string(&YearSelection::All).unwrap(), r#"{"kind":"all"}"#);
        let back: YearSelection = serde_json::from_str(r#"{"kind":"default"}"#).unwrap();
        assert_eq!(back, YearSelection::Default);
    }
}
