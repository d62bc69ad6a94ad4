use chrono::{Local, NaiveDate};
use eframe::App as EApp;
use egui::TextureHandle;
use log::{debug, error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::cache::CacheManager;
use crate::error::{Error, Result};
use crate::fetch::{parse_username, ContributionService, LoadOutcome, LoadRequest, ProfileUrls, SharedService};
use crate::i18n::{chart_labels, format_total, Period};
use crate::layout::{compute_layout, CalendarLayout, Cell, CellGeometry};
use crate::plotting::{render_calendar_cached, ChartTheme, RenderedChart};
use crate::selection::{self, SelectionView, YearSelection};
use crate::settings::{ThemePreference, UserSettings};
use crate::share::{self, render_share_text, ShareContext, ShareTarget};
use crate::types::ContributionData;

const LOG_TARGET: &str = "app";

/// The smallest limit common GPU backends guarantee.
const DEFAULT_MAX_TEXTURE_SIDE: usize = 8192;

/// A load handed to a background task.
pub struct PendingLoad {
    pub service: SharedService,
    pub request: LoadRequest,
    pub cancel: CancellationToken,
    /// Results of older loads are dropped
    pub generation: u64,
}

/// Main application state
pub struct App {
    pub settings: UserSettings,
    pub settings_path: Option<PathBuf>,
    pub url_input: String,
    pub username: Option<String>,
    pub data: Option<ContributionData>,
    pub selection: YearSelection,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub chart: Option<Arc<RenderedChart>>,
    pub chart_layout: Option<CalendarLayout>,
    /// Geometry the current chart was drawn with
    pub chart_geometry: CellGeometry,
    /// Largest texture side the renderer accepts
    pub max_texture_side: usize,
    pub chart_texture: Option<TextureHandle>,
    pub update_needed: bool,
    pub dark_mode: bool,
    pub show_settings: bool,
    pub applied_theme: Option<ThemePreference>,
    /// Load the saved profile on the first frame
    pub load_on_start: bool,
    service: Option<SharedService>,
    cancel: Option<CancellationToken>,
    generation: u64,
    /// Profile input of the load in flight, saved once it succeeds
    loading_profile: Option<String>,
}

impl App {
    pub fn new(settings: UserSettings, settings_path: Option<PathBuf>) -> Self {
        let url_input = settings.profile_url.clone();
        let selection = settings.selection;
        Self {
            load_on_start: !url_input.trim().is_empty(),
            settings,
            settings_path,
            url_input,
            username: None,
            data: None,
            selection,
            is_loading: false,
            error_message: None,
            status_message: None,
            chart: None,
            chart_layout: None,
            chart_geometry: CellGeometry::default(),
            max_texture_side: DEFAULT_MAX_TEXTURE_SIDE,
            chart_texture: None,
            update_needed: false,
            dark_mode: false,
            show_settings: false,
            applied_theme: None,
            service: None,
            cancel: None,
            generation: 0,
            loading_profile: None,
        }
    }

    /// Use `service` instead of building one from the fetch settings.
    pub fn with_service(mut self, service: SharedService) -> Self {
        self.service = Some(service);
        self
    }

    fn service(&mut self) -> Result<SharedService> {
        if let Some(service) = &self.service {
            return Ok(Arc::clone(service));
        }

        let cache = match CacheManager::default_dir() {
            Some(dir) => CacheManager::new(dir),
            None => CacheManager::in_memory(),
        };
        let service = Arc::new(ContributionService::from_options(&self.settings.fetch, cache)?);
        self.service = Some(Arc::clone(&service));
        Ok(service)
    }

    /// Drop the service so the next load picks up changed fetch settings.
    pub fn reset_service(&mut self) {
        self.service = None;
    }

    /// Prepare a load of `selection` for the profile in the URL field.
    ///
    /// Cancels the load in flight, if any. Returns `None` and sets an error
    /// when the input is not a profile.
    pub fn begin_load(&mut self, selection: YearSelection, force: bool) -> Option<PendingLoad> {
        let input = self.url_input.trim().to_string();
        let pending = self.begin_load_for(&input, selection, force)?;
        self.loading_profile = Some(input);
        Some(pending)
    }

    /// Prepare a load of `selection` for the user already on screen.
    ///
    /// Unsubmitted edits in the URL field are ignored.
    pub fn begin_selection_load(&mut self, selection: YearSelection) -> Option<PendingLoad> {
        match self.username.clone() {
            Some(username) => {
                let pending = self.begin_load_for(&username, selection, false)?;
                self.loading_profile = None;
                Some(pending)
            }
            None => self.begin_load(selection, false),
        }
    }

    fn begin_load_for(&mut self, input: &str, selection: YearSelection, force: bool) -> Option<PendingLoad> {
        let username = match parse_username(input) {
            Ok(username) => username,
            Err(e) => {
                self.error_message = Some(e.to_string());
                return None;
            }
        };
        let service = match self.service() {
            Ok(service) => service,
            Err(e) => {
                error!(target: LOG_TARGET, "Unable to set up fetching: {e}");
                self.error_message = Some(e.to_string());
                return None;
            }
        };

        if let Some(previous) = self.cancel.take() {
            debug!(target: LOG_TARGET, "Cancelling previous load");
            previous.cancel();
        }

        let same_user = self
            .username
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(&username));
        if !same_user {
            self.data = None;
            self.chart = None;
            self.chart_layout = None;
            self.chart_texture = None;
        }
        let known_years = self
            .data
            .as_ref()
            .map(|d| d.available_years.clone())
            .filter(|years| !years.is_empty());

        info!(target: LOG_TARGET, "Loading {selection:?} for '{username}'");
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());
        self.username = Some(username.clone());
        self.is_loading = true;
        self.error_message = None;
        self.status_message = None;

        Some(PendingLoad {
            service,
            request: LoadRequest {
                username,
                selection,
                known_years,
                today: today(),
                force,
            },
            cancel,
            generation: self.generation,
        })
    }

    /// Apply the result of the load started as `generation`.
    pub fn finish_load(&mut self, generation: u64, result: Result<LoadOutcome>) {
        if generation != self.generation {
            debug!(target: LOG_TARGET, "Dropping result of superseded load {generation}");
            return;
        }
        self.is_loading = false;
        self.cancel = None;

        match result {
            Ok(outcome) => {
                match &mut self.data {
                    Some(data) => data.merge(outcome.data),
                    None => self.data = Some(outcome.data),
                }
                self.selection = outcome.selection;
                self.settings.selection = outcome.selection;
                if let Some(profile) = self.loading_profile.take() {
                    self.settings.profile_url = profile;
                }
                self.update_needed = true;
                self.save_settings();
            }
            Err(Error::Cancelled) => debug!(target: LOG_TARGET, "Load {generation} cancelled"),
            Err(e) => {
                error!(target: LOG_TARGET, "Load failed: {e}");
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// Whether everything `selection` shows is already in memory.
    pub fn is_loaded(&self, selection: YearSelection) -> bool {
        let Some(data) = &self.data else {
            return false;
        };
        match selection {
            YearSelection::Default => !data.default_contributions.is_empty(),
            YearSelection::All => {
                !data.available_years.is_empty() && data.available_years.iter().all(|y| data.years.contains_key(y))
            }
            YearSelection::Year(year) => data.years.contains_key(&year),
        }
    }

    /// Switch to an already loaded selection.
    pub fn show_selection(&mut self, selection: YearSelection) {
        self.selection = selection;
        self.settings.selection = selection;
        self.update_needed = true;
        self.save_settings();
    }

    pub fn current_view(&self) -> Option<SelectionView> {
        selection::view(self.selection, self.data.as_ref()?)
    }

    pub fn period(&self) -> Period {
        match self.selection {
            YearSelection::Default => Period::LastYear,
            YearSelection::All => Period::AllTime,
            YearSelection::Year(year) => Period::Year(year),
        }
    }

    /// The localized total line for the current view.
    pub fn total_text(&self) -> Option<String> {
        let total = self.data.as_ref()?.total_for(self.selection)?;
        Some(format_total(self.settings.language, total, self.period()))
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        if self.dark_mode != dark {
            self.dark_mode = dark;
            self.update_needed = true;
        }
    }

    /// Lay out and paint the current view.
    pub fn rebuild_chart(&mut self) -> Result<()> {
        self.update_needed = false;
        self.chart_texture = None;

        let Some(view) = self.current_view() else {
            self.chart = None;
            self.chart_layout = None;
            return Ok(());
        };

        let layout = compute_layout(&view.contributions, view.mode, today(), view.total);
        let theme = ChartTheme::for_dark_mode(self.dark_mode);
        let labels = chart_labels(self.settings.language, self.total_text());
        let mut style = self.settings.chart.to_style();
        let max_width = u32::try_from(self.max_texture_side).unwrap_or(u32::MAX);
        style.geometry = style.geometry.fit_width(layout.weeks, max_width);

        let chart = render_calendar_cached(&layout, &theme, self.settings.palette, &style, &labels)?;
        debug!(target: LOG_TARGET, "Chart is {}x{} for {} weeks", chart.width, chart.height, layout.weeks);
        self.chart = Some(chart);
        self.chart_layout = Some(layout);
        self.chart_geometry = style.geometry;
        Ok(())
    }

    /// The day under a position in chart pixels.
    pub fn hovered_cell(&self, x: f32, y: f32) -> Option<&Cell> {
        let (week, weekday) = self.chart_geometry.hit_test(x, y)?;
        self.chart_layout.as_ref()?.cell_at(week, weekday)
    }

    pub fn share_context(&self) -> Option<ShareContext> {
        let username = self.username.clone()?;
        let view = self.current_view()?;
        Some(ShareContext {
            profile_url: ProfileUrls::default().profile(&username),
            username,
            total: view.total,
            period: self.period(),
        })
    }

    pub fn share_text(&self) -> Option<String> {
        let ctx = self.share_context()?;
        Some(render_share_text(&self.settings.share_text, &ctx, &self.settings.share))
    }

    pub fn copy_chart_image(&self) -> Result<()> {
        let chart = self.chart.as_ref().ok_or_else(nothing_to_export)?;
        share::copy_image(chart)
    }

    pub fn copy_share_text(&self) -> Result<()> {
        let text = self.share_text().ok_or_else(nothing_to_export)?;
        share::copy_text(&text)
    }

    /// Open `target`'s share page, putting the chart on the clipboard first
    /// when configured to.
    pub fn share_to(&self, target: ShareTarget) -> Result<()> {
        let ctx = self.share_context().ok_or_else(nothing_to_export)?;
        let text = render_share_text(&self.settings.share_text, &ctx, &self.settings.share);
        if self.settings.share.copy_image {
            self.copy_chart_image()?;
        }
        share::open_share(target, &text, &ctx.profile_url)
    }

    /// `octocat-2023.png`, `octocat-last-year.png` or `octocat-all.png`
    pub fn export_file_name(&self) -> String {
        let user = self.username.as_deref().unwrap_or("contributions");
        let suffix = match self.selection {
            YearSelection::Default => "last-year".to_string(),
            YearSelection::All => "all".to_string(),
            YearSelection::Year(year) => year.to_string(),
        };
        format!("{user}-{suffix}.png")
    }

    /// Write the chart as PNG into the downloads folder.
    pub fn save_png(&self) -> Result<PathBuf> {
        let chart = self.chart.as_ref().ok_or_else(nothing_to_export)?;
        let dir = dirs::download_dir()
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let path = dir.join(self.export_file_name());
        fs::write(&path, chart.to_png()?)?;
        info!(target: LOG_TARGET, "Saved chart to '{}'", path.display());
        Ok(path)
    }

    pub fn clear_cache(&mut self) {
        let Some(username) = self.username.clone() else {
            return;
        };
        if let Ok(service) = self.service() {
            service.clear_cache(&username);
            info!(target: LOG_TARGET, "Cleared cache of '{username}'");
        }
    }

    pub fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save(path) {
            warn!(target: LOG_TARGET, "Unable to save settings: {e}");
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(UserSettings::default(), None)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn nothing_to_export() -> Error {
    Error::Render("nothing loaded yet".to_string())
}

/// Thread-safe wrapper around App for use with eframe
pub struct AppWrapper {
    pub app: Arc<Mutex<App>>,
}

impl EApp for AppWrapper {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Ok(mut app) = self.app.lock() {
            super::ui::draw_ui(&mut app, ctx, Arc::clone(&self.app));
        } else {
            error!(target: LOG_TARGET, "Failed to acquire app lock in update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpSource;
    use crate::settings::ChartOptions;
    use crate::types::{Contribution, YearData};
    use std::time::Duration;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn loaded_data() -> ContributionData {
        let (from, to) = YearData::calendar_bounds(2023).unwrap();
        let contributions = vec![
            Contribution::new(day("2023-01-01"), 1, Some("2 contributions on January 1st.".to_string())),
            Contribution::new(day("2023-01-02"), 4, Some("9 contributions on January 2nd.".to_string())),
        ];
        ContributionData::assemble(
            "octocat",
            vec![2023],
            vec![YearData::new(2023, 11, from, to, contributions)],
            Vec::new(),
            None,
        )
    }

    fn loaded_app() -> App {
        let mut app = App::default();
        app.url_input = "https://github.com/octocat".to_string();
        app.username = Some("octocat".to_string());
        app.data = Some(loaded_data());
        app.selection = YearSelection::Year(2023);
        app.settings.chart = ChartOptions {
            weekday_labels: false,
            month_labels: false,
            legend: false,
            total: false,
        };
        app
    }

    #[test]
    fn test_invalid_input_sets_error() {
        let mut app = App::default();
        app.url_input = "https://gitlab.com/octocat".to_string();
        assert!(app.begin_load(YearSelection::Default, false).is_none());
        assert!(app.error_message.is_some());
        assert!(!app.is_loading);
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut app = loaded_app();
        app.generation = 2;
        app.is_loading = true;

        app.finish_load(1, Err(Error::BrowserTimeout));
        assert!(app.is_loading);
        assert!(app.error_message.is_none());

        app.finish_load(2, Err(Error::Cancelled));
        assert!(!app.is_loading);
        assert!(app.error_message.is_none());
    }

    /// A service whose requests never reach a server.
    fn unreachable_service() -> SharedService {
        let http = || Box::new(HttpSource::new(Duration::from_secs(1)).unwrap());
        Arc::new(ContributionService::new(
            http(),
            http(),
            ProfileUrls::new("http://127.0.0.1:1"),
            CacheManager::in_memory(),
        ))
    }

    #[test]
    fn test_new_load_cancels_previous() {
        let mut app = App::default().with_service(unreachable_service());
        app.url_input = "octocat".to_string();

        let first = app.begin_load(YearSelection::Default, false).unwrap();
        let second = app.begin_load(YearSelection::All, false).unwrap();
        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert_eq!(second.generation, first.generation + 1);

        let result = tokio_test::block_on(first.service.load(first.request, &first.cancel));
        assert!(matches!(result, Err(Error::Cancelled)));

        app.finish_load(first.generation, result);
        assert!(app.is_loading);
        second.cancel.cancel();
    }

    #[test]
    fn test_selection_load_keeps_current_user() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let mut settings = UserSettings::default();
        settings.profile_url = "https://github.com/octocat".to_string();
        let mut app = App::new(settings, Some(path.clone())).with_service(unreachable_service());
        app.username = Some("octocat".to_string());
        app.data = Some(loaded_data());
        app.url_input = "someone-else".to_string();

        let pending = app.begin_selection_load(YearSelection::Year(2022)).unwrap();
        assert_eq!(pending.request.username, "octocat");
        assert_eq!(pending.request.known_years, Some(vec![2023]));
        assert_eq!(app.url_input, "someone-else");

        let outcome = LoadOutcome {
            data: loaded_data(),
            selection: YearSelection::Year(2023),
        };
        app.finish_load(pending.generation, Ok(outcome));
        assert_eq!(UserSettings::load(&path).profile_url, "https://github.com/octocat");

        // With nobody loaded yet the URL field decides
        let mut fresh = App::default().with_service(unreachable_service());
        fresh.url_input = "github.com/hubot".to_string();
        let pending = fresh.begin_selection_load(YearSelection::All).unwrap();
        assert_eq!(pending.request.username, "hubot");
    }

    #[test]
    fn test_finish_load_saves_selection() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let mut app = App::new(UserSettings::default(), Some(path.clone())).with_service(unreachable_service());
        app.url_input = " github.com/octocat ".to_string();

        let pending = app.begin_load(YearSelection::Year(2023), false).unwrap();
        app.url_input = "github.com/someone-else".to_string();
        let outcome = LoadOutcome {
            data: loaded_data(),
            selection: YearSelection::Year(2023),
        };
        app.finish_load(pending.generation, Ok(outcome));

        assert!(app.update_needed);
        assert!(app.is_loaded(YearSelection::Year(2023)));
        assert!(app.is_loaded(YearSelection::All));
        assert!(!app.is_loaded(YearSelection::Default));

        let saved = UserSettings::load(&path);
        assert_eq!(saved.selection, YearSelection::Year(2023));
        assert_eq!(saved.profile_url, "github.com/octocat");
    }

    #[test]
    fn test_chart_and_hover() {
        let mut app = loaded_app();
        app.rebuild_chart().unwrap();
        assert!(app.chart.is_some());

        let geometry = app.settings.chart.to_style().geometry;
        // 2023-01-02 is the Monday of the first week
        let (x, y) = geometry.cell_origin(0, 1);
        let cell = app.hovered_cell(x + 1.0, y + 1.0).unwrap();
        assert_eq!(cell.date, day("2023-01-02"));
        assert_eq!(cell.level, 4);
        assert!(app.hovered_cell(0.0, 0.0).is_none());
    }

    #[test]
    fn test_long_history_fits_texture_limit() {
        let years: Vec<_> = (2008..=2023)
            .map(|year| {
                let (from, to) = YearData::calendar_bounds(year).unwrap();
                let days = vec![Contribution::new(from, 1, None), Contribution::new(to, 2, None)];
                YearData::new(year, 2, from, to, days)
            })
            .collect();
        let mut app = loaded_app();
        app.data = Some(ContributionData::assemble("octocat", (2008..=2023).rev().collect(), years, Vec::new(), None));
        app.selection = YearSelection::All;
        app.max_texture_side = 4096;

        app.rebuild_chart().unwrap();
        let chart = app.chart.as_ref().unwrap();
        let weeks = app.chart_layout.as_ref().unwrap().weeks;
        assert!(weeks > 800);
        assert!(chart.width <= 4096);
        assert!(app.chart_geometry.cell < app.settings.chart.to_style().geometry.cell);

        // 2023-12-31 is a Sunday in the last column
        let (x, y) = app.chart_geometry.cell_origin(weeks - 1, 0);
        let cell = app.hovered_cell(x, y).unwrap();
        assert_eq!(cell.date, day("2023-12-31"));
    }

    #[test]
    fn test_share_text_and_file_name() {
        let app = loaded_app();
        assert_eq!(app.period(), Period::Year(2023));
        assert_eq!(
            app.share_text().unwrap(),
            "octocat made 11 contributions on GitHub in 2023! https://github.com/octocat"
        );
        assert_eq!(app.total_text().unwrap(), "11 contributions in 2023");
        assert_eq!(app.export_file_name(), "octocat-2023.png");
    }
}
