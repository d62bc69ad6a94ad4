//! Reads calendar days and year links out of GitHub pages.

use chrono::NaiveDate;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::markup::{self, Tag};
use crate::types::Contribution;

const LOG_TARGET: &str = "scrape";

static TOTAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d,]+)\s+contributions?").expect("invalid regex"));
static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("invalid regex"));

/// Class names that mark the calendar table, current and legacy markup.
const CALENDAR_MARKERS: &[&str] = &["ContributionCalendar-grid", "js-calendar-graph-table", "js-calendar-graph-svg"];

/// One day cell read from the page.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrapedDay {
    pub date: NaiveDate,
    pub level: i64,
    pub tooltip: Option<String>,
    /// Explicit `data-count` on legacy markup
    pub count: Option<u32>,
}

impl ScrapedDay {
    pub fn to_contribution(&self) -> Contribution {
        Contribution::new(self.date, self.level, self.tooltip.clone())
    }

    /// The explicit count, else the count stated by the tooltip.
    pub fn contribution_count(&self) -> Option<u32> {
        self.count.or_else(|| self.to_contribution().count())
    }
}

/// A year offered by the profile's year switcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearLink {
    pub year: i32,
    pub href: Option<String>,
}

/// Whether the page carries the contribution calendar table.
pub fn has_calendar(html: &str) -> bool {
    CALENDAR_MARKERS.iter().any(|marker| html.contains(marker))
}

fn is_day_cell(tag: &Tag) -> bool {
    if tag.closing {
        return false;
    }
    match tag.name.as_str() {
        "td" => tag.has_class("ContributionCalendar-day") || tag.attr("role") == Some("gridcell"),
        "rect" => tag.has_class("ContributionCalendar-day") || tag.has_class("day"),
        _ => false,
    }
}

/// Tooltip texts found in `<tool-tip>` elements, keyed three ways.
#[derive(Debug, Default)]
struct TooltipIndex {
    by_id: HashMap<String, String>,
    by_target: HashMap<String, String>,
    by_date: HashMap<String, String>,
}

impl TooltipIndex {
    fn build(html: &str) -> Self {
        let mut index = Self::default();
        for tag in markup::tags(html).filter(|t| !t.closing && t.name == "tool-tip") {
            let text = markup::inner_text(html, &tag);
            if text.is_empty() {
                continue;
            }
            if let Some(id) = tag.attr("id") {
                index.by_id.insert(id.to_string(), text.clone());
            }
            if let Some(target) = tag.attr("for") {
                index.by_target.insert(target.to_string(), text.clone());
            }
            if let Some(date) = tag.attr("data-date") {
                index.by_date.insert(date.to_string(), text);
            }
        }
        index
    }

    /// `aria-label`, then `aria-labelledby`, then the tooltip targeting the
    /// cell id, then one keyed by date.
    fn resolve(&self, cell: &Tag, date: &str) -> Option<String> {
        if let Some(label) = cell.attr("aria-label").map(markup::collapse_whitespace) {
            if !label.is_empty() {
                return Some(label);
            }
        }

        if let Some(ids) = cell.attr("aria-labelledby") {
            if let Some(text) = ids.split_whitespace().find_map(|id| self.by_id.get(id)) {
                return Some(text.clone());
            }
        }

        cell.attr("id")
            .and_then(|id| self.by_target.get(id))
            .or_else(|| self.by_date.get(date))
            .cloned()
    }
}

/// Read every dated day cell from a calendar page.
///
/// Cells without a parseable `data-date` (legend swatches, labels) are
/// skipped. Levels are returned raw; clamping happens when they become
/// [`Contribution`]s.
pub fn extract_days(html: &str) -> Vec<ScrapedDay> {
    let tooltips = TooltipIndex::build(html);
    let mut days = Vec::new();

    for cell in markup::tags(html).filter(is_day_cell) {
        let mut date_attr = cell.attr("data-date").map(str::to_string);
        let mut level_attr = cell.attr("data-level").map(str::to_string);
        let mut count_attr = cell.attr("data-count").map(str::to_string);

        if date_attr.is_none() || level_attr.is_none() {
            for inner in markup::descendants(html, &cell) {
                if date_attr.is_none() {
                    date_attr = inner.attr("data-date").map(str::to_string);
                }
                if level_attr.is_none() {
                    level_attr = inner.attr("data-level").map(str::to_string);
                }
                if count_attr.is_none() {
                    count_attr = inner.attr("data-count").map(str::to_string);
                }
                if date_attr.is_some() && level_attr.is_some() {
                    break;
                }
            }
        }

        let Some(raw_date) = date_attr else {
            continue;
        };
        let date = match NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                debug!(target: LOG_TARGET, "Skipping day cell with date '{raw_date}': {e}");
                continue;
            }
        };

        let level = level_attr.and_then(|l| l.trim().parse::<i64>().ok()).unwrap_or(0);
        let count = count_attr.and_then(|c| c.trim().parse::<u32>().ok());
        let tooltip = tooltips.resolve(&cell, &raw_date);

        days.push(ScrapedDay {
            date,
            level,
            tooltip,
            count,
        });
    }

    debug!(target: LOG_TARGET, "Extracted {} day cells", days.len());
    days
}

/// Years listed by the profile's year switcher, newest first.
pub fn extract_year_links(html: &str) -> Vec<YearLink> {
    let mut links: Vec<YearLink> = Vec::new();

    for tag in markup::tags(html).filter(|t| !t.closing && t.name == "a") {
        let id_year = tag
            .attr("id")
            .and_then(|id| id.strip_prefix("year-link-"))
            .and_then(|y| y.parse::<i32>().ok());

        let year = match id_year {
            Some(year) => year,
            None if tag.has_class("js-year-link") => {
                let text = markup::inner_text(html, &tag);
                match YEAR_REGEX.captures(&text).and_then(|c| c[1].parse().ok()) {
                    Some(year) => year,
                    None => continue,
                }
            }
            None => continue,
        };

        if links.iter().all(|l| l.year != year) {
            links.push(YearLink {
                year,
                href: tag.attr("href").map(str::to_string),
            });
        }
    }

    links.sort_by(|a, b| b.year.cmp(&a.year));
    links
}

/// The "1,234 contributions in ..." heading above the calendar.
pub fn extract_total(html: &str) -> Option<u32> {
    let heading = markup::tags(html)
        .find(|t| !t.closing && t.attr("id") == Some("js-contribution-activity-description"))
        .or_else(|| {
            markup::tags(html)
                .filter(|t| !t.closing && t.name == "h2")
                .find(|t| TOTAL_REGEX.is_match(&markup::inner_text(html, t)))
        })?;

    let text = markup::inner_text(html, &heading);
    TOTAL_REGEX
        .captures(&text)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}
