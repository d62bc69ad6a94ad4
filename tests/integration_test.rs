//! End-to-end tests against a mock GitHub served by wiremock

use chrono::NaiveDate;
use contribgraph::cache::CacheManager;
use contribgraph::fetch::{
    BrowserSource, ContributionService, FallbackSource, HttpSource, LoadRequest, PageSource, ProfileUrls,
};
use contribgraph::layout::{compute_layout, TRAILING_WEEKS};
use contribgraph::selection::{self, YearSelection};
use contribgraph::Error;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}")).expect("Failed to read fixture file")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn http() -> HttpSource {
    HttpSource::new(Duration::from_secs(5)).unwrap()
}

fn service(server: &MockServer, cache: CacheManager) -> ContributionService {
    ContributionService::new(
        Box::new(FallbackSource::browser_then_http(None, http())),
        Box::new(FallbackSource::browser_then_http(None, http()).accepting_any_page()),
        ProfileUrls::new(server.uri()),
        cache,
    )
}

fn request(selection: YearSelection) -> LoadRequest {
    LoadRequest {
        username: "octocat".to_string(),
        selection,
        known_years: None,
        today: today(),
        force: false,
    }
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture("profile.html")))
        .mount(server)
        .await;
}

async fn mount_year(server: &MockServer, year: i32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/users/octocat/contributions"))
        .and(query_param("from", format!("{year}-01-01")))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounted last so the year mocks match first.
async fn mount_default(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/octocat/contributions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture("calendar_default.html")))
        .mount(server)
        .await;
}

async fn contribution_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/users/octocat/contributions")
        .count()
}

#[tokio::test]
async fn test_http_source_fetches_page() {
    let server = MockServer::start().await;
    mount_profile(&server).await;

    let html = http().fetch(&format!("{}/octocat", server.uri())).await.unwrap();
    assert!(html.contains("year-link-2023"));

    let missing = http().fetch(&format!("{}/nobody", server.uri())).await;
    assert!(matches!(missing, Err(Error::HttpStatus { status: 404, .. })));
}

#[tokio::test]
async fn test_failing_browser_falls_back_to_http() {
    let server = MockServer::start().await;
    mount_year(&server, 2023, ResponseTemplate::new(200).set_body_string(fixture("calendar_2023.html"))).await;

    let browser = BrowserSource::new("/nonexistent/chromium", Duration::from_secs(2));
    let source = FallbackSource::browser_then_http(Some(browser), http());
    let url = ProfileUrls::new(server.uri()).year_calendar("octocat", 2023);

    let html = source.fetch(&url).await.unwrap();
    assert!(html.contains("ContributionCalendar-grid"));
}

#[tokio::test]
async fn test_load_year_and_reuse_disk_cache() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_profile(&server).await;
    mount_year(&server, 2023, ResponseTemplate::new(200).set_body_string(fixture("calendar_2023.html"))).await;

    let outcome = service(&server, CacheManager::new(temp_dir.path()))
        .load(request(YearSelection::Year(2023)), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.selection, YearSelection::Year(2023));
    assert_eq!(outcome.data.available_years, vec![2024, 2023, 2022]);
    let year = outcome.data.year(2023).unwrap();
    assert_eq!(year.total, 1753);
    assert_eq!(year.contributions.len(), 365);
    assert!(year.is_consistent());

    let july_4th = year
        .contributions
        .iter()
        .find(|c| c.date == NaiveDate::from_ymd_opt(2023, 7, 4).unwrap())
        .unwrap();
    assert_eq!(july_4th.level, 3);
    assert_eq!(july_4th.count(), Some(8));
    assert!(temp_dir.path().join("octocat.json").exists());

    // A fresh process reads 2023 from disk
    let offline = MockServer::start().await;
    mount_profile(&offline).await;
    let cached = service(&offline, CacheManager::new(temp_dir.path()))
        .load(request(YearSelection::Year(2023)), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(cached.data.year(2023), outcome.data.year(2023));
    assert_eq!(contribution_requests(&offline).await, 0);
}

#[tokio::test]
async fn test_load_default_view() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    mount_default(&server).await;

    let outcome = service(&server, CacheManager::in_memory())
        .load(request(YearSelection::Default), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.data.default_total, Some(1750));
    assert_eq!(outcome.data.default_contributions.len(), 365);

    let view = selection::view(outcome.selection, &outcome.data).unwrap();
    let layout = compute_layout(&view.contributions, view.mode, today(), view.total);
    assert_eq!(layout.weeks, TRAILING_WEEKS);
    assert_eq!(layout.last_day, Some(today()));
}

#[tokio::test]
async fn test_all_years_skip_failing_year() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    mount_year(&server, 2023, ResponseTemplate::new(200).set_body_string(fixture("calendar_2023.html"))).await;
    mount_year(&server, 2022, ResponseTemplate::new(500)).await;
    // The current year is served by the trailing calendar, which holds 2024 days
    mount_default(&server).await;

    let outcome = service(&server, CacheManager::in_memory())
        .load(request(YearSelection::All), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.data.years.keys().copied().collect::<Vec<_>>(), vec![2023, 2024]);
    assert!(outcome.data.years.values().all(|y| y.is_consistent()));
    assert!(outcome.data.default_contributions.is_empty());
}
