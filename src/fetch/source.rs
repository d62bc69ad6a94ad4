//! Page sources: plain HTTP or a headless browser, with fallback between them.

use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::scrape::has_calendar;
use crate::error::{Error, Result};

const LOG_TARGET: &str = "source";

/// Sent with every request; GitHub serves the full calendar markup to desktop browsers.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Something that can turn a URL into page HTML.
pub trait PageSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Plain HTTP GET of the static page.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!(target: LOG_TARGET, "GET {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

impl PageSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>> {
        self.get(url).boxed()
    }
}

/// Loads pages in a headless Chromium-family browser so client-side
/// fragments are rendered before the DOM is read.
#[derive(Clone, Debug)]
pub struct BrowserSource {
    executable: PathBuf,
    timeout: Duration,
    /// Virtual time granted to the first attempt; doubled on every retry
    initial_budget: Duration,
    /// Marker that must appear in the DOM before it is accepted
    wait_for_calendar: bool,
}

impl BrowserSource {
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
            initial_budget: Duration::from_millis(1500),
            wait_for_calendar: true,
        }
    }

    /// Use the configured browser, or look for one installed on this machine.
    pub fn discover(configured: Option<&Path>, timeout: Duration) -> Option<Self> {
        let executable = match configured {
            Some(path) if !path.as_os_str().is_empty() => Some(path.to_path_buf()),
            _ => find_browser(),
        }?;
        Some(Self::new(executable, timeout))
    }

    /// Accept whatever the browser renders instead of waiting for the calendar.
    pub fn without_calendar_wait(mut self) -> Self {
        self.wait_for_calendar = false;
        self
    }

    async fn dump_dom(&self, url: &str, budget: Duration) -> Result<String> {
        let output = Command::new(&self.executable)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--hide-scrollbars")
            .arg(format!("--user-agent={USER_AGENT}"))
            .arg(format!("--virtual-time-budget={}", budget.as_millis()))
            .arg("--dump-dom")
            .arg(url)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Browser(format!("unable to start '{}': {e}", self.executable.display())))?;

        if !output.status.success() {
            return Err(Error::Browser(format!("browser exited with {}", output.status)));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Poll the page until the calendar appears or the timeout elapses.
    async fn load(&self, url: &str) -> Result<String> {
        let started = Instant::now();
        let mut budget = self.initial_budget;

        loop {
            let remaining = self.timeout.checked_sub(started.elapsed()).ok_or(Error::BrowserTimeout)?;
            let html = tokio::time::timeout(remaining, self.dump_dom(url, budget))
                .await
                .map_err(|_| Error::BrowserTimeout)??;

            if !self.wait_for_calendar || has_calendar(&html) {
                debug!(target: LOG_TARGET, "Browser rendered {url} in {:.1}s", started.elapsed().as_secs_f64());
                return Ok(html);
            }

            debug!(target: LOG_TARGET, "Calendar not rendered yet for {url} after {}ms of virtual time", budget.as_millis());
            budget *= 2;
            if started.elapsed() + budget / 4 >= self.timeout {
                return Err(Error::BrowserTimeout);
            }
        }
    }
}

impl PageSource for BrowserSource {
    fn name(&self) -> &str {
        "browser"
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>> {
        self.load(url).boxed()
    }
}

/// Look for Edge, Chrome or Chromium.
pub fn find_browser() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if cfg!(windows) {
        for base in ["ProgramFiles(x86)", "ProgramFiles", "LOCALAPPDATA"] {
            if let Some(dir) = std::env::var_os(base).map(PathBuf::from) {
                candidates.push(dir.join(r"Microsoft\Edge\Application\msedge.exe"));
                candidates.push(dir.join(r"Google\Chrome\Application\chrome.exe"));
            }
        }
    }

    let names = ["msedge", "google-chrome", "chrome", "chromium", "chromium-browser"];
    if let Some(path) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path) {
            for name in names {
                candidates.push(dir.join(name));
                candidates.push(dir.join(format!("{name}.exe")));
            }
        }
    }

    let found = candidates.into_iter().find(|p| p.is_file());
    match &found {
        Some(path) => info!(target: LOG_TARGET, "Using headless browser at '{}'", path.display()),
        None => debug!(target: LOG_TARGET, "No headless browser found"),
    }
    found
}

/// Tries each source in order and returns the first page that is usable.
pub struct FallbackSource {
    sources: Vec<Box<dyn PageSource>>,
    require_calendar: bool,
}

impl FallbackSource {
    pub fn new(sources: Vec<Box<dyn PageSource>>) -> Self {
        Self {
            sources,
            require_calendar: true,
        }
    }

    /// Browser first when one is available, HTTP last.
    pub fn browser_then_http(browser: Option<BrowserSource>, http: HttpSource) -> Self {
        let mut sources: Vec<Box<dyn PageSource>> = Vec::new();
        if let Some(browser) = browser {
            sources.push(Box::new(browser));
        }
        sources.push(Box::new(http));
        Self::new(sources)
    }

    /// Accept any page, not only ones carrying the calendar.
    pub fn accepting_any_page(mut self) -> Self {
        self.require_calendar = false;
        self
    }

    async fn fetch_first(&self, url: &str) -> Result<String> {
        let mut last_error = None;
        let mut last_page = None;

        for (i, source) in self.sources.iter().enumerate() {
            let is_last = i + 1 == self.sources.len();
            match source.fetch(url).await {
                Ok(html) if !self.require_calendar || has_calendar(&html) => return Ok(html),
                Ok(html) => {
                    if !is_last {
                        warn!(target: LOG_TARGET, "{} returned no calendar for {url}, falling back", source.name());
                    }
                    last_page = Some(html);
                }
                Err(e) => {
                    if !is_last {
                        warn!(target: LOG_TARGET, "{} failed for {url}: {e}, falling back", source.name());
                    }
                    last_error = Some(e);
                }
            }
        }

        match (last_page, last_error) {
            (Some(_), _) => Err(Error::CalendarNotFound { url: url.to_string() }),
            (None, Some(e)) => Err(e),
            (None, None) => Err(Error::CalendarNotFound { url: url.to_string() }),
        }
    }
}

impl PageSource for FallbackSource {
    fn name(&self) -> &str {
        "fallback"
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>> {
        self.fetch_first(url).boxed()
    }
}
