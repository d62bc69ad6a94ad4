//! # Calendar Layout
//!
//! Places contributions on the 7-row week grid GitHub uses. Columns are
//! weeks starting on Sunday, rows are weekdays (0 = Sunday). Nothing here
//! draws; [`crate::plotting`] paints a [`CalendarLayout`].

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;

use crate::types::{Contribution, MAX_LEVEL};

/// Weeks shown by the trailing view.
pub const TRAILING_WEEKS: usize = 53;

/// How the visible date range is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RangeMode {
    /// A fixed 53-week window ending at the newest day
    TrailingWeeks,
    /// From the first contribution to the last
    FullRange,
}

/// One painted day.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub week: usize,
    pub weekday: usize,
    pub date: NaiveDate,
    pub level: u8,
    pub tooltip: Option<String>,
}

/// A month name placed above the week holding the month's first day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonthLabel {
    pub week: usize,
    pub year: i32,
    pub month: u32,
}

/// Everything needed to paint one calendar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CalendarLayout {
    /// Sunday of the first column
    pub start: Option<NaiveDate>,
    /// First and last day with a cell
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub weeks: usize,
    pub cells: Vec<Cell>,
    pub month_labels: Vec<MonthLabel>,
    pub total: Option<u32>,
}

impl CalendarLayout {
    /// The five legend swatches, lightest first.
    pub fn legend(&self) -> [u8; 5] {
        [0, 1, 2, 3, MAX_LEVEL]
    }

    pub fn cell_at(&self, week: usize, weekday: usize) -> Option<&Cell> {
        if weekday > 6 {
            return None;
        }
        // Cells are emitted day by day, so the index is the day offset minus the leading gap.
        let first_offset = self.cells.first().map(|c| c.week * 7 + c.weekday)?;
        let index = (week * 7 + weekday).checked_sub(first_offset)?;
        self.cells.get(index).filter(|c| c.week == week && c.weekday == weekday)
    }
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Number of week columns from the week of `first` to the week of `last`.
pub fn week_count(first: NaiveDate, last: NaiveDate) -> usize {
    if last < first {
        return 0;
    }
    ((week_start(last) - week_start(first)).num_days() / 7 + 1) as usize
}

/// First and last day in view.
pub fn visible_range(contributions: &[Contribution], mode: RangeMode, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = contributions.iter().map(|c| c.date).min();
    let last = contributions.iter().map(|c| c.date).max();

    match mode {
        RangeMode::TrailingWeeks => {
            let end = last.unwrap_or(today);
            let start = week_start(end) - Duration::weeks(TRAILING_WEEKS as i64 - 1);
            Some((start, end))
        }
        RangeMode::FullRange => Some((first?, last?)),
    }
}

/// Lay `contributions` out on the week grid.
///
/// Every day between the first and last visible day gets a cell; days with
/// no data are level 0. A month label is emitted for each week that holds
/// the first day of a month.
pub fn compute_layout(contributions: &[Contribution], mode: RangeMode, today: NaiveDate, total: Option<u32>) -> CalendarLayout {
    let Some((first_day, last_day)) = visible_range(contributions, mode, today) else {
        return CalendarLayout {
            total,
            ..CalendarLayout::default()
        };
    };

    let start = week_start(first_day);
    let weeks = week_count(first_day, last_day);
    let by_date: HashMap<NaiveDate, &Contribution> = contributions.iter().map(|c| (c.date, c)).collect();

    let mut cells = Vec::with_capacity(weeks * 7);
    let mut month_labels = Vec::new();

    for day in first_day.iter_days().take_while(|d| *d <= last_day) {
        let offset = (day - start).num_days() as usize;
        let week = offset / 7;
        let weekday = offset % 7;

        if day.day() == 1 {
            month_labels.push(MonthLabel {
                week,
                year: day.year(),
                month: day.month(),
            });
        }

        let contribution = by_date.get(&day);
        cells.push(Cell {
            week,
            weekday,
            date: day,
            level: contribution.map(|c| c.level.min(MAX_LEVEL)).unwrap_or(0),
            tooltip: contribution.and_then(|c| c.tooltip.clone()),
        });
    }

    CalendarLayout {
        start: Some(start),
        first_day: Some(first_day),
        last_day: Some(last_day),
        weeks,
        cells,
        month_labels,
        total,
    }
}

/// Pixel geometry of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGeometry {
    pub cell: f32,
    pub gap: f32,
    /// Room left of the grid for weekday names
    pub left_gutter: f32,
    /// Room above the grid for month names
    pub top_gutter: f32,
    /// Room below the grid for the legend and total
    pub bottom_band: f32,
    pub padding: f32,
}

impl Default for CellGeometry {
    fn default() -> Self {
        Self {
            cell: 11.0,
            gap: 3.0,
            left_gutter: 32.0,
            top_gutter: 20.0,
            bottom_band: 28.0,
            padding: 8.0,
        }
    }
}

impl CellGeometry {
    fn pitch(&self) -> f32 {
        self.cell + self.gap
    }

    /// Top-left corner of a cell, in canvas pixels.
    pub fn cell_origin(&self, week: usize, weekday: usize) -> (f32, f32) {
        (
            self.padding + self.left_gutter + week as f32 * self.pitch(),
            self.padding + self.top_gutter + weekday as f32 * self.pitch(),
        )
    }

    /// Height of the seven rows.
    pub fn grid_height(&self) -> f32 {
        7.0 * self.pitch() - self.gap
    }

    /// Canvas size for `weeks` columns.
    pub fn canvas_size(&self, weeks: usize) -> (u32, u32) {
        let grid_width = (weeks.max(1) as f32 * self.pitch() - self.gap).max(0.0);
        // The legend needs room even for very short ranges.
        let width = (2.0 * self.padding + self.left_gutter + grid_width).max(260.0);
        let height = 2.0 * self.padding + self.top_gutter + self.grid_height() + self.bottom_band;
        (width.ceil() as u32, height.ceil() as u32)
    }

    /// Shrink the cells so `weeks` columns fit in `max_width` pixels.
    ///
    /// Gutters keep their size. The pitch never drops below one pixel.
    pub fn fit_width(self, weeks: usize, max_width: u32) -> Self {
        if weeks == 0 || self.canvas_size(weeks).0 <= max_width {
            return self;
        }

        let available = max_width as f32 - 2.0 * self.padding - self.left_gutter;
        let pitch = (available / weeks as f32).floor().max(1.0);
        let gap = (pitch * self.gap / self.pitch()).round().min(pitch - 1.0).max(0.0);
        Self {
            cell: pitch - gap,
            gap,
            ..self
        }
    }

    /// The (week, weekday) under a canvas position, gaps excluded.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let gx = x - self.padding - self.left_gutter;
        let gy = y - self.padding - self.top_gutter;
        if gx < 0.0 || gy < 0.0 {
            return None;
        }

        let week = (gx / self.pitch()) as usize;
        let weekday = (gy / self.pitch()) as usize;
        let inside = gx - week as f32 * self.pitch() < self.cell && gy - weekday as f32 * self.pitch() < self.cell;
        (weekday < 7 && inside).then_some((week, weekday))
    }
}
