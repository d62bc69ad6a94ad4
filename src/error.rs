//! # Errors
//!
//! The error type shared by the fetch, cache, drawing and clipboard layers.

use thiserror::Error;

/// Everything that can go wrong between a profile URL and a painted calendar.
#[derive(Debug, Error)]
pub enum Error {
    #[error("'{0}' is not a GitHub profile URL or username")]
    InvalidProfileUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("headless browser failed: {0}")]
    Browser(String),

    #[error("headless browser did not render the contribution calendar in time")]
    BrowserTimeout,

    #[error("no contribution calendar found at {url}")]
    CalendarNotFound { url: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to draw the calendar: {0}")]
    Render(String),

    #[error("invalid share link: {0}")]
    ShareUrl(#[from] url::ParseError),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
