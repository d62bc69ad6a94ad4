//! Loads what a selection needs, reading past years from the cache.

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::aggregate::{build_default, build_year, default_from_years, window_total};
use super::profile::ProfileUrls;
use super::scrape::{extract_days, extract_total, extract_year_links};
use super::source::{BrowserSource, FallbackSource, HttpSource, PageSource};
use crate::cache::CacheManager;
use crate::error::{Error, Result};
use crate::selection::{self, YearSelection};
use crate::settings::FetchOptions;
use crate::types::{CacheKey, Contribution, ContributionData, YearData};

const LOG_TARGET: &str = "service";

/// What the UI asks for.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub username: String,
    pub selection: YearSelection,
    /// Years discovered by an earlier load; skips the profile page
    pub known_years: Option<Vec<i32>>,
    pub today: NaiveDate,
    /// Ignore cached years
    pub force: bool,
}

/// The data a load produced and the selection it was produced for.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadOutcome {
    pub data: ContributionData,
    pub selection: YearSelection,
}

/// Fetches, scrapes, aggregates and caches contribution calendars.
pub struct ContributionService {
    calendar_source: Box<dyn PageSource>,
    profile_source: Box<dyn PageSource>,
    urls: ProfileUrls,
    cache: Mutex<CacheManager>,
}

impl ContributionService {
    pub fn new(
        calendar_source: Box<dyn PageSource>,
        profile_source: Box<dyn PageSource>,
        urls: ProfileUrls,
        cache: CacheManager,
    ) -> Self {
        Self {
            calendar_source,
            profile_source,
            urls,
            cache: Mutex::new(cache),
        }
    }

    /// Browser-then-HTTP sources against github.com.
    pub fn from_options(options: &FetchOptions, cache: CacheManager) -> Result<Self> {
        let http = HttpSource::new(options.http_timeout())?;
        let browser = if options.use_browser {
            let configured = Some(Path::new(options.browser_path.as_str()));
            BrowserSource::discover(configured, options.browser_timeout())
        } else {
            None
        };

        let calendar = FallbackSource::browser_then_http(browser.clone(), http.clone());
        let profile =
            FallbackSource::browser_then_http(browser.map(BrowserSource::without_calendar_wait), http).accepting_any_page();

        Ok(Self::new(Box::new(calendar), Box::new(profile), ProfileUrls::default(), cache))
    }

    pub fn urls(&self) -> &ProfileUrls {
        &self.urls
    }

    fn with_cache<T>(&self, f: impl FnOnce(&mut CacheManager) -> T) -> T {
        match self.cache.lock() {
            Ok(mut cache) => f(&mut cache),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn clear_cache(&self, username: &str) {
        self.with_cache(|cache| cache.clear_user(username));
    }

    /// Years offered on the profile page, newest first.
    ///
    /// Falls back to cached years, then to the current year alone.
    pub async fn discover_years(&self, username: &str, current_year: i32) -> Vec<i32> {
        let url = self.urls.profile(username);
        match self.profile_source.fetch(&url).await {
            Ok(html) => {
                let years: Vec<i32> = extract_year_links(&html).into_iter().map(|l| l.year).collect();
                if !years.is_empty() {
                    debug!(target: LOG_TARGET, "Profile of '{username}' lists {} years", years.len());
                    return years;
                }
                debug!(target: LOG_TARGET, "Profile of '{username}' lists no years");
            }
            Err(e) => warn!(target: LOG_TARGET, "Unable to read profile of '{username}': {e}"),
        }

        let cached = self.with_cache(|cache| {
            cache.load_user(username);
            cache.cached_years(username)
        });
        if cached.is_empty() {
            vec![current_year]
        } else {
            cached
        }
    }

    /// The trailing-year calendar and its reported total.
    pub async fn fetch_default(&self, username: &str, today: NaiveDate) -> Result<(Vec<Contribution>, Option<u32>)> {
        let url = self.urls.default_calendar(username);
        let html = self.calendar_source.fetch(&url).await?;

        let days = extract_days(&html);
        if days.is_empty() {
            return Err(Error::CalendarNotFound { url });
        }

        let contributions = build_default(&days, today);
        let total = extract_total(&html).or_else(|| Some(window_total(&contributions)));
        Ok((contributions, total))
    }

    /// One year, from the cache when allowed.
    ///
    /// The current year is never served from the cache.
    pub async fn fetch_year(&self, username: &str, year: i32, current_year: i32, force: bool) -> Result<YearData> {
        if !force && year != current_year {
            let cached = self.with_cache(|cache| {
                cache.load_user(username);
                cache.get(&CacheKey::new(username, year)).cloned()
            });
            if let Some(data) = cached {
                return Ok(data);
            }
        }

        let url = self.urls.year_calendar(username, year);
        let html = self.calendar_source.fetch(&url).await?;
        let days = extract_days(&html);
        if days.is_empty() {
            return Err(Error::CalendarNotFound { url });
        }

        let data = build_year(year, &days, extract_total(&html)).ok_or(Error::CalendarNotFound { url })?;
        info!(target: LOG_TARGET, "Fetched {year} for '{username}': {} contributions", data.total);

        if let Err(e) = self.with_cache(|cache| cache.store(username, data.clone())) {
            warn!(target: LOG_TARGET, "Unable to cache {year} for '{username}': {e}");
        }
        Ok(data)
    }

    /// Load what `request.selection` needs, one request at a time.
    pub async fn load(&self, request: LoadRequest, cancel: &CancellationToken) -> Result<LoadOutcome> {
        let username = request.username.as_str();
        let current_year = request.today.year();

        let cached_years = self.with_cache(|cache| {
            cache.load_user(username);
            cache.cached_years(username)
        });

        let available = match request.known_years.filter(|years| !years.is_empty()) {
            Some(years) => years,
            None => cancellable(cancel, async { Ok(self.discover_years(username, current_year).await) }).await?,
        };

        let selection = selection::resolve(request.selection, &available);
        let usable_cache = if request.force { Vec::new() } else { cached_years };
        let plan = selection::plan(selection, &available, &usable_cache, current_year);
        debug!(target: LOG_TARGET, "Loading {selection:?} for '{username}': {plan:?}");

        let mut years = Vec::new();
        for year in &plan.cached {
            if let Some(data) = self.with_cache(|cache| cache.get(&CacheKey::new(username, *year)).cloned()) {
                years.push(data);
            }
        }

        let mut last_error = None;
        for year in &plan.fetch {
            match cancellable(cancel, self.fetch_year(username, *year, current_year, request.force)).await {
                Ok(data) => years.push(data),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) if selection == YearSelection::All => {
                    warn!(target: LOG_TARGET, "Skipping {year} for '{username}': {e}");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        if selection == YearSelection::All && years.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let (default_contributions, default_total) = if plan.default {
            match cancellable(cancel, self.fetch_default(username, request.today)).await {
                Ok(default) => default,
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    let cached: Vec<YearData> = self.with_cache(|cache| {
                        cache
                            .cached_years(username)
                            .into_iter()
                            .filter_map(|y| cache.get(&CacheKey::new(username, y)).cloned())
                            .collect()
                    });
                    if cached.is_empty() {
                        return Err(e);
                    }
                    warn!(target: LOG_TARGET, "Using cached years for the default view of '{username}': {e}");
                    let window = default_from_years(&cached, request.today);
                    let total = window_total(&window);
                    (window, Some(total))
                }
            }
        } else {
            (Vec::new(), None)
        };

        Ok(LoadOutcome {
            data: ContributionData::assemble(username, available, years, default_contributions, default_total),
            selection,
        })
    }
}

/// Run `work` unless `cancel` fires first. Errors from `work` pass through.
async fn cancellable<T>(cancel: &CancellationToken, work: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = work => result,
    }
}

/// Shared handle used by the UI.
pub type SharedService = Arc<ContributionService>;
