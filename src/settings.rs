//! Persisted user preferences.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::i18n::Language;
use crate::plotting::{ChartStyle, Palette};
use crate::selection::YearSelection;

const LOG_TARGET: &str = "settings";

/// Overrides the directory holding `settings.json`.
pub const CONFIG_DIR_ENV: &str = "CONTRIBGRAPH_CONFIG_DIR";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

/// Which conveniences the share actions include.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareOptions {
    pub include_total: bool,
    pub include_link: bool,
    /// Put the chart image on the clipboard before opening a share page
    pub copy_image: bool,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            include_total: true,
            include_link: true,
            copy_image: false,
        }
    }
}

/// Which decorations the chart draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub weekday_labels: bool,
    pub month_labels: bool,
    pub legend: bool,
    pub total: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            weekday_labels: true,
            month_labels: true,
            legend: true,
            total: true,
        }
    }
}

impl ChartOptions {
    pub fn to_style(self) -> ChartStyle {
        ChartStyle {
            show_weekday_labels: self.weekday_labels,
            show_month_labels: self.month_labels,
            show_legend: self.legend,
            show_total: self.total,
            ..ChartStyle::default()
        }
    }
}

/// How pages are fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Try a headless browser before plain HTTP
    pub use_browser: bool,
    /// Browser executable; found automatically when empty
    pub browser_path: String,
    pub browser_timeout_secs: u64,
    pub http_timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            use_browser: true,
            browser_path: String::new(),
            browser_timeout_secs: 20,
            http_timeout_secs: 15,
        }
    }
}

impl FetchOptions {
    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

/// Everything remembered between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub profile_url: String,
    pub theme: ThemePreference,
    pub palette: Palette,
    pub language: Language,
    pub selection: YearSelection,
    pub share_text: String,
    pub share: ShareOptions,
    pub chart: ChartOptions,
    pub fetch: FetchOptions,
}

pub const DEFAULT_SHARE_TEXT: &str = "{user} made {total} on GitHub {period}! {url}";

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            profile_url: String::new(),
            theme: ThemePreference::default(),
            palette: Palette::default(),
            language: Language::default(),
            selection: YearSelection::default(),
            share_text: DEFAULT_SHARE_TEXT.to_string(),
            share: ShareOptions::default(),
            chart: ChartOptions::default(),
            fetch: FetchOptions::default(),
        }
    }
}

impl UserSettings {
    /// `$CONTRIBGRAPH_CONFIG_DIR/settings.json`, else `<config dir>/contribgraph/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()?.join("contribgraph"),
        };
        Some(dir.join("settings.json"))
    }

    /// Read settings, falling back to defaults when the file is missing or broken.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!(target: LOG_TARGET, "No settings at '{}': {e}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(target: LOG_TARGET, "Ignoring invalid settings '{}': {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(target: LOG_TARGET, "Saved settings to '{}'", path.display());
        Ok(())
    }
}
