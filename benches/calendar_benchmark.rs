/// Benchmark module for the scrape, layout and drawing stages.
/// Uses the full-year calendar fixture shared with the integration tests.
use chrono::NaiveDate;
use contribgraph::cache::CacheManager;
use contribgraph::fetch::aggregate::build_year;
use contribgraph::fetch::extract_days;
use contribgraph::layout::{compute_layout, RangeMode};
use contribgraph::plotting::{render_calendar, ChartLabels, ChartStyle, ChartTheme, Palette};
use contribgraph::types::CacheKey;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use tempfile::TempDir;

fn calendar_fixture() -> String {
    fs::read_to_string("tests/fixtures/calendar_2023.html").unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// Benchmark extraction and aggregation of one year page
///
/// # Arguments
/// * `c` - Criterion benchmark configuration
fn bench_scrape(c: &mut Criterion) {
    let mut group = c.benchmark_group("scrape");
    let html = calendar_fixture();

    group.bench_function("extract_days", |b| b.iter(|| extract_days(black_box(&html))));

    let days = extract_days(&html);
    group.bench_function("build_year", |b| b.iter(|| build_year(2023, black_box(&days), None)));

    group.finish();
}

/// Benchmark grid layout and bitmap drawing
///
/// # Arguments
/// * `c` - Criterion benchmark configuration
fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    let days = extract_days(&calendar_fixture());
    let year = build_year(2023, &days, None).unwrap();

    group.bench_function("layout_full_range", |b| {
        b.iter(|| compute_layout(black_box(&year.contributions), RangeMode::FullRange, today(), Some(year.total)))
    });
    group.bench_function("layout_trailing_weeks", |b| {
        b.iter(|| compute_layout(black_box(&year.contributions), RangeMode::TrailingWeeks, today(), None))
    });

    let layout = compute_layout(&year.contributions, RangeMode::FullRange, today(), Some(year.total));
    let theme = ChartTheme::light();
    let labels = ChartLabels::default();

    group.bench_function("render_cells", |b| {
        let style = ChartStyle::bare();
        b.iter(|| render_calendar(black_box(&layout), &theme, Palette::Green, &style, &labels).unwrap())
    });
    group.bench_function("render_with_labels", |b| {
        let style = ChartStyle::default();
        b.iter(|| render_calendar(black_box(&layout), &theme, Palette::Green, &style, &labels).unwrap())
    });

    group.finish();
}

/// Benchmark cache writes and lookups
///
/// # Arguments
/// * `c` - Criterion benchmark configuration
fn bench_caching(c: &mut Criterion) {
    let mut group = c.benchmark_group("caching");
    let days = extract_days(&calendar_fixture());
    let year = build_year(2023, &days, None).unwrap();
    let temp_dir = TempDir::new().unwrap();

    group.bench_function("store_year", |b| {
        let mut cache = CacheManager::new(temp_dir.path());
        b.iter(|| cache.store("octocat", year.clone()).unwrap())
    });

    let mut cache = CacheManager::in_memory();
    cache.store("octocat", year.clone()).unwrap();
    group.bench_function("cache_lookup", |b| {
        b.iter(|| cache.get(black_box(&CacheKey::new("octocat", 2023))).is_some())
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_scrape, bench_rendering, bench_caching
);
criterion_main!(benches);
