//! Painting calendar layouts into bitmaps.

mod chart;
pub mod styles;


pub use chart::{render_calendar, render_calendar_cached, ChartLabels, RenderedChart};
pub use styles::{ChartStyle, ChartTheme, Palette};
