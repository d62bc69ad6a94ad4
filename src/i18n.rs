//! Localized UI strings.

use serde::{Deserialize, Serialize};

use crate::plotting::ChartLabels;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    ChineseSimplified,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::ChineseSimplified, Language::Japanese];

    /// Name shown in the language picker, in the language itself.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::ChineseSimplified => "简体中文",
            Language::Japanese => "日本語",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextKey {
    AppTitle,
    ProfileUrl,
    Load,
    Refresh,
    Loading,
    Year,
    DefaultView,
    AllYears,
    Theme,
    ThemeSystem,
    ThemeLight,
    ThemeDark,
    Palette,
    Language,
    CopyImage,
    CopyShareText,
    SavePng,
    Share,
    Copied,
    Saved,
    NoData,
    ShareTemplate,
    IncludeTotal,
    IncludeLink,
    CopyImageWithText,
    Settings,
    UseBrowser,
    BrowserPath,
    ClearCache,
    WeekdayLabels,
    MonthLabels,
    Legend,
    ShowTotal,
    Less,
    More,
}

/// Look up `key` in `lang`.
pub fn tr(lang: Language, key: TextKey) -> &'static str {
    match (lang, key) {
        (Language::English, TextKey::AppTitle) => "GitHub Contributions",
        (Language::English, TextKey::ProfileUrl) => "Profile URL or username",
        (Language::English, TextKey::Load) => "Load",
        (Language::English, TextKey::Refresh) => "Refresh",
        (Language::English, TextKey::Loading) => "Loading contributions...",
        (Language::English, TextKey::Year) => "Year",
        (Language::English, TextKey::DefaultView) => "Last year",
        (Language::English, TextKey::AllYears) => "All years",
        (Language::English, TextKey::Theme) => "Theme",
        (Language::English, TextKey::ThemeSystem) => "System",
        (Language::English, TextKey::ThemeLight) => "Light",
        (Language::English, TextKey::ThemeDark) => "Dark",
        (Language::English, TextKey::Palette) => "Colors",
        (Language::English, TextKey::Language) => "Language",
        (Language::English, TextKey::CopyImage) => "Copy image",
        (Language::English, TextKey::CopyShareText) => "Copy share text",
        (Language::English, TextKey::SavePng) => "Save PNG",
        (Language::English, TextKey::Share) => "Share",
        (Language::English, TextKey::Copied) => "Copied to clipboard",
        (Language::English, TextKey::Saved) => "Saved",
        (Language::English, TextKey::NoData) => "Enter a GitHub profile to see its contributions.",
        (Language::English, TextKey::ShareTemplate) => "Share text",
        (Language::English, TextKey::IncludeTotal) => "Include total",
        (Language::English, TextKey::IncludeLink) => "Include profile link",
        (Language::English, TextKey::CopyImageWithText) => "Copy image with text",
        (Language::English, TextKey::Settings) => "Settings",
        (Language::English, TextKey::UseBrowser) => "Render pages in a headless browser",
        (Language::English, TextKey::BrowserPath) => "Browser executable",
        (Language::English, TextKey::ClearCache) => "Clear cache",
        (Language::English, TextKey::WeekdayLabels) => "Weekday labels",
        (Language::English, TextKey::MonthLabels) => "Month labels",
        (Language::English, TextKey::Legend) => "Legend",
        (Language::English, TextKey::ShowTotal) => "Total",
        (Language::English, TextKey::Less) => "Less",
        (Language::English, TextKey::More) => "More",

        (Language::ChineseSimplified, TextKey::AppTitle) => "GitHub 贡献图",
        (Language::ChineseSimplified, TextKey::ProfileUrl) => "主页地址或用户名",
        (Language::ChineseSimplified, TextKey::Load) => "加载",
        (Language::ChineseSimplified, TextKey::Refresh) => "刷新",
        (Language::ChineseSimplified, TextKey::Loading) => "正在加载贡献数据...",
        (Language::ChineseSimplified, TextKey::Year) => "年份",
        (Language::ChineseSimplified, TextKey::DefaultView) => "最近一年",
        (Language::ChineseSimplified, TextKey::AllYears) => "全部年份",
        (Language::ChineseSimplified, TextKey::Theme) => "主题",
        (Language::ChineseSimplified, TextKey::ThemeSystem) => "跟随系统",
        (Language::ChineseSimplified, TextKey::ThemeLight) => "浅色",
        (Language::ChineseSimplified, TextKey::ThemeDark) => "深色",
        (Language::ChineseSimplified, TextKey::Palette) => "配色",
        (Language::ChineseSimplified, TextKey::Language) => "语言",
        (Language::ChineseSimplified, TextKey::CopyImage) => "复制图片",
        (Language::ChineseSimplified, TextKey::CopyShareText) => "复制分享文字",
        (Language::ChineseSimplified, TextKey::SavePng) => "保存 PNG",
        (Language::ChineseSimplified, TextKey::Share) => "分享",
        (Language::ChineseSimplified, TextKey::Copied) => "已复制到剪贴板",
        (Language::ChineseSimplified, TextKey::Saved) => "已保存",
        (Language::ChineseSimplified, TextKey::NoData) => "输入 GitHub 主页以查看贡献图。",
        (Language::ChineseSimplified, TextKey::ShareTemplate) => "分享文字",
        (Language::ChineseSimplified, TextKey::IncludeTotal) => "包含总数",
        (Language::ChineseSimplified, TextKey::IncludeLink) => "包含主页链接",
        (Language::ChineseSimplified, TextKey::CopyImageWithText) => "复制文字时同时复制图片",
        (Language::ChineseSimplified, TextKey::Settings) => "设置",
        (Language::ChineseSimplified, TextKey::UseBrowser) => "使用无头浏览器渲染页面",
        (Language::ChineseSimplified, TextKey::BrowserPath) => "浏览器路径",
        (Language::ChineseSimplified, TextKey::ClearCache) => "清除缓存",
        (Language::ChineseSimplified, TextKey::WeekdayLabels) => "星期标签",
        (Language::ChineseSimplified, TextKey::MonthLabels) => "月份标签",
        (Language::ChineseSimplified, TextKey::Legend) => "图例",
        (Language::ChineseSimplified, TextKey::ShowTotal) => "总数",
        (Language::ChineseSimplified, TextKey::Less) => "少",
        (Language::ChineseSimplified, TextKey::More) => "多",

        (Language::Japanese, TextKey::AppTitle) => "GitHub コントリビューション",
        (Language::Japanese, TextKey::ProfileUrl) => "プロフィール URL またはユーザー名",
        (Language::Japanese, TextKey::Load) => "読み込む",
        (Language::Japanese, TextKey::Refresh) => "更新",
        (Language::Japanese, TextKey::Loading) => "コントリビューションを読み込み中...",
        (Language::Japanese, TextKey::Year) => "年",
        (Language::Japanese, TextKey::DefaultView) => "過去 1 年",
        (Language::Japanese, TextKey::AllYears) => "すべての年",
        (Language::Japanese, TextKey::Theme) => "テーマ",
        (Language::Japanese, TextKey::ThemeSystem) => "システム",
        (Language::Japanese, TextKey::ThemeLight) => "ライト",
        (Language::Japanese, TextKey::ThemeDark) => "ダーク",
        (Language::Japanese, TextKey::Palette) => "配色",
        (Language::Japanese, TextKey::Language) => "言語",
        (Language::Japanese, TextKey::CopyImage) => "画像をコピー",
        (Language::Japanese, TextKey::CopyShareText) => "共有テキストをコピー",
        (Language::Japanese, TextKey::SavePng) => "PNG を保存",
        (Language::Japanese, TextKey::Share) => "共有",
        (Language::Japanese, TextKey::Copied) => "クリップボードにコピーしました",
        (Language::Japanese, TextKey::Saved) => "保存しました",
        (Language::Japanese, TextKey::NoData) => "GitHub プロフィールを入力してください。",
        (Language::Japanese, TextKey::ShareTemplate) => "共有テキスト",
        (Language::Japanese, TextKey::IncludeTotal) => "合計を含める",
        (Language::Japanese, TextKey::IncludeLink) => "プロフィールリンクを含める",
        (Language::Japanese, TextKey::CopyImageWithText) => "テキストと一緒に画像もコピー",
        (Language::Japanese, TextKey::Settings) => "設定",
        (Language::Japanese, TextKey::UseBrowser) => "ヘッドレスブラウザでページを描画",
        (Language::Japanese, TextKey::BrowserPath) => "ブラウザの実行ファイル",
        (Language::Japanese, TextKey::ClearCache) => "キャッシュを削除",
        (Language::Japanese, TextKey::WeekdayLabels) => "曜日ラベル",
        (Language::Japanese, TextKey::MonthLabels) => "月ラベル",
        (Language::Japanese, TextKey::Legend) => "凡例",
        (Language::Japanese, TextKey::ShowTotal) => "合計",
        (Language::Japanese, TextKey::Less) => "少",
        (Language::Japanese, TextKey::More) => "多",
    }
}

/// Short month names, January first.
pub fn month_names(lang: Language) -> [&'static str; 12] {
    match lang {
        Language::English => ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
        Language::ChineseSimplified => ["1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月"],
        Language::Japanese => ["1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月"],
    }
}

/// Short weekday names, Sunday first.
pub fn weekday_names(lang: Language) -> [&'static str; 7] {
    match lang {
        Language::English => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        Language::ChineseSimplified => ["日", "一", "二", "三", "四", "五", "六"],
        Language::Japanese => ["日", "月", "火", "水", "木", "金", "土"],
    }
}

/// What a total refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    LastYear,
    Year(i32),
    AllTime,
}

/// Group digits in threes: `12345` becomes `12,345`.
pub fn group_digits(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// "1,234 contributions in 2023" and its translations.
pub fn format_total(lang: Language, total: u32, period: Period) -> String {
    let n = group_digits(total);
    match (lang, period) {
        (Language::English, Period::LastYear) => {
            let noun = if total == 1 { "contribution" } else { "contributions" };
            format!("{n} {noun} in the last year")
        }
        (Language::English, Period::Year(y)) => {
            let noun = if total == 1 { "contribution" } else { "contributions" };
            format!("{n} {noun} in {y}")
        }
        (Language::English, Period::AllTime) => {
            let noun = if total == 1 { "contribution" } else { "contributions" };
            format!("{n} {noun} in total")
        }
        (Language::ChineseSimplified, Period::LastYear) => format!("过去一年共 {n} 次贡献"),
        (Language::ChineseSimplified, Period::Year(y)) => format!("{y} 年共 {n} 次贡献"),
        (Language::ChineseSimplified, Period::AllTime) => format!("累计 {n} 次贡献"),
        (Language::Japanese, Period::LastYear) => format!("過去 1 年間のコントリビューション: {n}"),
        (Language::Japanese, Period::Year(y)) => format!("{y} 年のコントリビューション: {n}"),
        (Language::Japanese, Period::AllTime) => format!("累計コントリビューション: {n}"),
    }
}

/// Everything the chart draws as text, in `lang`.
pub fn chart_labels(lang: Language, total: Option<String>) -> ChartLabels {
    ChartLabels {
        months: month_names(lang).iter().map(|s| s.to_string()).collect(),
        weekdays: weekday_names(lang).iter().map(|s| s.to_string()).collect(),
        less: tr(lang, TextKey::Less).to_string(),
        more: tr(lang, TextKey::More).to_string(),
        total,
    }
}
