use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::layout::CellGeometry;

/// Chart theme configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartTheme {
    pub dark: bool,
    pub background_color: RGBColor,
    pub text_color: RGBColor,
    /// Level 0 swatch
    pub empty_color: RGBColor,
}

impl ChartTheme {
    pub fn light() -> Self {
        Self {
            dark: false,
            background_color: RGBColor(255, 255, 255),
            text_color: RGBColor(31, 35, 40),
            empty_color: RGBColor(235, 237, 240),
        }
    }

    pub fn dark() -> Self {
        Self {
            dark: true,
            background_color: RGBColor(13, 17, 23),
            text_color: RGBColor(230, 237, 243),
            empty_color: RGBColor(22, 27, 34),
        }
    }

    pub fn for_dark_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::light()
    }
}

/// Swatch colors for levels 1 to 4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    #[default]
    Green,
    Blue,
    Purple,
    Orange,
    Gray,
}

impl Palette {
    pub const ALL: [Palette; 5] = [Palette::Green, Palette::Blue, Palette::Purple, Palette::Orange, Palette::Gray];

    pub fn name(self) -> &'static str {
        match self {
            Palette::Green => "Green",
            Palette::Blue => "Blue",
            Palette::Purple => "Purple",
            Palette::Orange => "Halloween",
            Palette::Gray => "Gray",
        }
    }

    /// All five swatches, level 0 first.
    pub fn colors(self, theme: &ChartTheme) -> [RGBColor; 5] {
        let [a, b, c, d] = match (self, theme.dark) {
            (Palette::Green, false) => [0x9be9a8, 0x40c463, 0x30a14e, 0x216e39],
            (Palette::Green, true) => [0x0e4429, 0x006d32, 0x26a641, 0x39d353],
            (Palette::Blue, false) => [0xc0ddf9, 0x73b3f3, 0x3886e1, 0x1b4f91],
            (Palette::Blue, true) => [0x0c2d6b, 0x1158c7, 0x388bfd, 0x79c0ff],
            (Palette::Purple, false) => [0xd8b9ff, 0xa371f7, 0x8250df, 0x6639ba],
            (Palette::Purple, true) => [0x3c1e70, 0x6e40c9, 0x8957e5, 0xd2a8ff],
            (Palette::Orange, false) => [0xffee4a, 0xffc501, 0xfe9600, 0x03001c],
            (Palette::Orange, true) => [0x631c03, 0xbd561d, 0xfa7a18, 0xfddf68],
            (Palette::Gray, false) => [0xd0d7de, 0xafb8c1, 0x6e7781, 0x424a53],
            (Palette::Gray, true) => [0x30363d, 0x484f58, 0x6e7681, 0xb1bac4],
        };
        [theme.empty_color, hex(a), hex(b), hex(c), hex(d)]
    }
}

fn hex(value: u32) -> RGBColor {
    RGBColor((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

/// Chart style configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartStyle {
    pub geometry: CellGeometry,
    pub font_size: u32,
    pub show_weekday_labels: bool,
    pub show_month_labels: bool,
    pub show_legend: bool,
    pub show_total: bool,
}

impl ChartStyle {
    /// Cells only, no text at all.
    pub fn bare() -> Self {
        Self {
            show_weekday_labels: false,
            show_month_labels: false,
            show_legend: false,
            show_total: false,
            ..Self::default()
        }
    }

    pub fn draws_text(&self) -> bool {
        self.show_weekday_labels || self.show_month_labels || self.show_legend || self.show_total
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            geometry: CellGeometry::default(),
            font_size: 12,
            show_weekday_labels: true,
            show_month_labels: true,
            show_legend: true,
            show_total: true,
        }
    }
}
