//! Getting contribution calendars off GitHub.
//!
//! Pages come from a [`PageSource`] (a headless browser, plain HTTP, or both
//! in turn), are scraped into day cells and aggregated into the structures in
//! [`crate::types`]. [`ContributionService`] ties this to the on-disk cache.

pub mod aggregate;
pub mod markup;
pub mod profile;
pub mod scrape;
mod service;
pub mod source;


pub use profile::{parse_username, ProfileUrls};
pub use scrape::{extract_days, extract_total, extract_year_links, ScrapedDay, YearLink};
pub use service::{ContributionService, LoadOutcome, LoadRequest, SharedService};
pub use source::{BrowserSource, FallbackSource, HttpSource, PageSource};
