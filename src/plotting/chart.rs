use once_cell::sync::Lazy;
use plotters::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use super::styles::{ChartStyle, ChartTheme, Palette};
use crate::error::{Error, Result};
use crate::layout::CalendarLayout;

// Cache up to 16 rendered charts
static RENDER_CACHE: Lazy<Mutex<LruCache<u64, Arc<RenderedChart>>>> =
    Lazy::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(16).expect("non-zero capacity"))));

/// Localized text drawn around the grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChartLabels {
    /// Short month names, January first
    pub months: Vec<String>,
    /// Short weekday names, Sunday first
    pub weekdays: Vec<String>,
    pub less: String,
    pub more: String,
    /// "1,234 contributions in the last year"
    pub total: Option<String>,
}

impl Default for ChartLabels {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            months: owned(&["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]),
            weekdays: owned(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]),
            less: "Less".to_string(),
            more: "More".to_string(),
            total: None,
        }
    }
}

/// A painted calendar as packed RGB pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedChart {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RenderedChart {
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgb([self.width as usize, self.height as usize], &self.rgb)
    }

    /// Pixels with an opaque alpha channel, as clipboards expect.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.rgb.len() / 3 * 4);
        for px in self.rgb.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        rgba
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let image = image::RgbImage::from_raw(self.width, self.height, self.rgb.clone())
            .ok_or_else(|| Error::Render("pixel buffer does not match chart size".to_string()))?;

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| Error::Render(e.to_string()))?;
        Ok(png.into_inner())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some((self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]))
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// Paint `layout` into a fresh bitmap.
pub fn render_calendar(
    layout: &CalendarLayout,
    theme: &ChartTheme,
    palette: Palette,
    style: &ChartStyle,
    labels: &ChartLabels,
) -> Result<RenderedChart> {
    let geometry = style.geometry;
    let (width, height) = geometry.canvas_size(layout.weeks);
    let mut rgb = vec![0u8; width as usize * height as usize * 3];

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&theme.background_color).map_err(render_err)?;

        let colors = palette.colors(theme);
        let size = geometry.cell as i32;

        // Cells, column by column
        for cell in &layout.cells {
            let (x, y) = geometry.cell_origin(cell.week, cell.weekday);
            let (x, y) = (x as i32, y as i32);
            let color = colors[cell.level.min(4) as usize];
            root.draw(&Rectangle::new([(x, y), (x + size - 1, y + size - 1)], color.filled()))
                .map_err(render_err)?;
        }

        let font = ("sans-serif", style.font_size).into_font().color(&theme.text_color);
        let small = ("sans-serif", style.font_size.saturating_sub(1).max(1))
            .into_font()
            .color(&theme.text_color);

        if style.show_month_labels {
            let y = (geometry.padding + 2.0) as i32;
            let mut previous: Option<usize> = None;
            for label in &layout.month_labels {
                // Two labels need three columns between them to stay legible
                if previous.is_some_and(|week| label.week < week + 3) {
                    continue;
                }
                let Some(name) = labels.months.get(label.month as usize - 1) else {
                    continue;
                };
                let (x, _) = geometry.cell_origin(label.week, 0);
                root.draw_text(name, &font, (x as i32, y)).map_err(render_err)?;
                previous = Some(label.week);
            }
        }

        if style.show_weekday_labels && layout.weeks > 0 {
            for weekday in [1usize, 3, 5] {
                let Some(name) = labels.weekdays.get(weekday) else {
                    continue;
                };
                let (_, y) = geometry.cell_origin(0, weekday);
                root.draw_text(name, &small, (geometry.padding as i32, y as i32 - 1))
                    .map_err(render_err)?;
            }
        }

        let band_y = (geometry.padding + geometry.top_gutter + geometry.grid_height() + 8.0) as i32;

        if style.show_total {
            if let Some(total) = &labels.total {
                let x = (geometry.padding + geometry.left_gutter) as i32;
                root.draw_text(total, &font, (x, band_y)).map_err(render_err)?;
            }
        }

        if style.show_legend {
            let right = width as i32 - geometry.padding as i32;
            let (more_w, _) = root.estimate_text_size(&labels.more, &small).map_err(render_err)?;
            let (less_w, _) = root.estimate_text_size(&labels.less, &small).map_err(render_err)?;
            let pitch = size + geometry.gap as i32;

            let more_x = right - more_w as i32;
            let swatches_x = more_x - 4 - 5 * pitch;
            let less_x = swatches_x - 4 - less_w as i32;

            root.draw_text(&labels.less, &small, (less_x, band_y)).map_err(render_err)?;
            for (i, level) in layout.legend().iter().enumerate() {
                let x = swatches_x + i as i32 * pitch;
                let color = colors[*level as usize];
                root.draw(&Rectangle::new([(x, band_y), (x + size - 1, band_y + size - 1)], color.filled()))
                    .map_err(render_err)?;
            }
            root.draw_text(&labels.more, &small, (more_x, band_y)).map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
    }

    Ok(RenderedChart { width, height, rgb })
}

fn render_key(layout: &CalendarLayout, theme: &ChartTheme, palette: Palette, style: &ChartStyle, labels: &ChartLabels) -> u64 {
    let mut hasher = DefaultHasher::new();
    layout.hash(&mut hasher);
    palette.hash(&mut hasher);
    labels.hash(&mut hasher);
    for color in [theme.background_color, theme.text_color, theme.empty_color] {
        (color.0, color.1, color.2).hash(&mut hasher);
    }
    let g = style.geometry;
    for value in [g.cell, g.gap, g.left_gutter, g.top_gutter, g.bottom_band, g.padding] {
        value.to_bits().hash(&mut hasher);
    }
    (
        style.font_size,
        style.show_weekday_labels,
        style.show_month_labels,
        style.show_legend,
        style.show_total,
    )
        .hash(&mut hasher);
    hasher.finish()
}

/// Like [`render_calendar`], reusing a recent identical rendering.
pub fn render_calendar_cached(
    layout: &CalendarLayout,
    theme: &ChartTheme,
    palette: Palette,
    style: &ChartStyle,
    labels: &ChartLabels,
) -> Result<Arc<RenderedChart>> {
    let key = render_key(layout, theme, palette, style, labels);

    if let Ok(mut cache) = RENDER_CACHE.lock() {
        if let Some(chart) = cache.get(&key) {
            return Ok(Arc::clone(chart));
        }
    }

    let chart = Arc::new(render_calendar(layout, theme, palette, style, labels)?);
    if let Ok(mut cache) = RENDER_CACHE.lock() {
        cache.put(key, Arc::clone(&chart));
    }
    Ok(chart)
}
