//! # GitHub Contribution Graph Viewer
//!
//! `contribgraph` scrapes the contribution calendar of a GitHub profile and
//! renders it as a heat map in a small desktop application.
//!
//! ## Features
//!
//! - Accepts a profile URL, an `@login` or a bare login
//! - Loads the trailing year, any single year, or the whole history
//! - Renders pages in a headless browser when one is installed, with plain
//!   HTTP as the fallback
//! - Caches past years on disk
//! - Copies the chart or a share text to the clipboard and opens share pages
//!
//! ## Example
//!
//! ```no_run
//! use contribgraph::cache::CacheManager;
//! use contribgraph::fetch::{ContributionService, LoadRequest};
//! use contribgraph::layout::compute_layout;
//! use contribgraph::selection::{self, YearSelection};
//! use contribgraph::settings::FetchOptions;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> contribgraph::Result<()> {
//! let service = ContributionService::from_options(&FetchOptions::default(), CacheManager::in_memory())?;
//! let today = chrono::Local::now().date_naive();
//! let request = LoadRequest {
//!     username: "octocat".to_string(),
//!     selection: YearSelection::Default,
//!     known_years: None,
//!     today,
//!     force: false,
//! };
//! let outcome = service.load(request, &CancellationToken::new()).await?;
//!
//! if let Some(view) = selection::view(outcome.selection, &outcome.data) {
//!     let layout = compute_layout(&view.contributions, view.mode, today, view.total);
//!     println!("{} weeks", layout.weeks);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod i18n;
pub mod layout;
pub mod plotting;
pub mod selection;
pub mod settings;
pub mod share;
pub mod types;

// Re-export main types for convenience
pub use app::App as ContribGraphApp;
pub use error::{Error, Result};
pub use types::{CacheKey, Contribution, ContributionData, YearData};
