use egui::{Button, ComboBox, Context, FontData, FontDefinitions, FontFamily};
use log::{debug, error};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::{App, PendingLoad};
use crate::i18n::{tr, Language, TextKey};
use crate::layout::Cell;
use crate::plotting::Palette;
use crate::selection::{self, YearSelection};
use crate::settings::ThemePreference;
use crate::share::ShareTarget;

const LOG_TARGET: &str = "ui";

/// System fonts that cover the CJK labels egui's bundled fonts lack.
const CJK_FONT_CANDIDATES: &[&str] = &[
    r"C:\Windows\Fonts\msyh.ttc",
    r"C:\Windows\Fonts\YuGothM.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
];

/// Default fonts, with the first CJK font found appended as a fallback.
pub fn configure_fonts(ctx: &Context) {
    let mut fonts = FontDefinitions::default();

    if let Some((path, bytes)) = CJK_FONT_CANDIDATES
        .iter()
        .find_map(|p| std::fs::read(p).ok().map(|bytes| (*p, bytes)))
    {
        debug!(target: LOG_TARGET, "Using '{path}' for CJK text");
        fonts.font_data.insert("cjk".to_string(), FontData::from_owned(bytes));
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            fonts.families.entry(family).or_default().push("cjk".to_string());
        }
    }

    ctx.set_fonts(fonts);
}

/// Draw the main application UI
pub fn draw_ui(app: &mut App, ctx: &Context, app_arc: Arc<Mutex<App>>) {
    apply_theme(app, ctx);
    let lang = app.settings.language;

    if std::mem::take(&mut app.load_on_start) {
        let selection = app.selection;
        start_load(app, ctx, &app_arc, selection, false);
    }

    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(tr(lang, TextKey::ProfileUrl));
            let response = ui.add(
                egui::TextEdit::singleline(&mut app.url_input)
                    .hint_text("https://github.com/octocat")
                    .desired_width(320.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.add_enabled(!app.is_loading, Button::new(tr(lang, TextKey::Load))).clicked() || submitted {
                let selection = app.selection;
                start_load(app, ctx, &app_arc, selection, false);
            }
            let can_refresh = !app.is_loading && app.username.is_some();
            if ui.add_enabled(can_refresh, Button::new(tr(lang, TextKey::Refresh))).clicked() {
                let selection = app.selection;
                start_load(app, ctx, &app_arc, selection, true);
            }

            if app.is_loading {
                ui.spinner();
                ui.label(tr(lang, TextKey::Loading));
            }
        });

        ui.horizontal(|ui| {
            // Year selection
            let available = app.data.as_ref().map(|d| d.available_years.clone()).unwrap_or_default();
            let mut selected = app.selection;
            ComboBox::new("year_selector", tr(lang, TextKey::Year))
                .selected_text(selection_label(lang, selected))
                .show_ui(ui, |ui| {
                    for option in selection::options(&available) {
                        ui.selectable_value(&mut selected, option, selection_label(lang, option));
                    }
                });
            if selected != app.selection {
                handle_selection_change(app, ctx, &app_arc, selected);
            }

            ui.separator();

            let prev_theme = app.settings.theme;
            ComboBox::new("theme_selector", tr(lang, TextKey::Theme))
                .selected_text(theme_label(lang, app.settings.theme))
                .show_ui(ui, |ui| {
                    for theme in [ThemePreference::System, ThemePreference::Light, ThemePreference::Dark] {
                        ui.selectable_value(&mut app.settings.theme, theme, theme_label(lang, theme));
                    }
                });

            let prev_palette = app.settings.palette;
            ComboBox::new("palette_selector", tr(lang, TextKey::Palette))
                .selected_text(app.settings.palette.name())
                .show_ui(ui, |ui| {
                    for palette in Palette::ALL {
                        ui.selectable_value(&mut app.settings.palette, palette, palette.name());
                    }
                });

            let prev_language = app.settings.language;
            ComboBox::new("language_selector", tr(lang, TextKey::Language))
                .selected_text(app.settings.language.native_name())
                .show_ui(ui, |ui| {
                    for language in Language::ALL {
                        ui.selectable_value(&mut app.settings.language, language, language.native_name());
                    }
                });

            if prev_palette != app.settings.palette || prev_language != app.settings.language {
                app.update_needed = true;
            }
            if prev_theme != app.settings.theme
                || prev_palette != app.settings.palette
                || prev_language != app.settings.language
            {
                app.save_settings();
            }

            ui.separator();
            ui.toggle_value(&mut app.show_settings, tr(lang, TextKey::Settings));
        });
        ui.add_space(4.0);
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        if let Some(message) = &app.error_message {
            ui.colored_label(ui.visuals().error_fg_color, message);
        } else if let Some(message) = &app.status_message {
            ui.label(message);
        } else {
            ui.label(" ");
        }
    });

    let max_texture_side = ctx.input(|i| i.max_texture_side);
    if app.max_texture_side != max_texture_side {
        app.max_texture_side = max_texture_side;
        app.update_needed = true;
    }

    // Update chart if needed
    if app.update_needed {
        if let Err(e) = app.rebuild_chart() {
            error!(target: LOG_TARGET, "Plotting error: {e}");
            app.error_message = Some(e.to_string());
        }
    }
    if app.chart_texture.is_none() {
        if let Some(chart) = app.chart.clone() {
            app.chart_texture = Some(ctx.load_texture(
                "contribution_chart",
                chart.to_color_image(),
                egui::TextureOptions::NEAREST,
            ));
        }
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        if let Some(username) = &app.username {
            ui.heading(username);
        } else {
            ui.heading(tr(lang, TextKey::AppTitle));
        }
        if let Some(total) = app.total_text() {
            ui.label(total);
        }
        ui.separator();

        egui::ScrollArea::horizontal().show(ui, |ui| {
            if let Some(texture) = &app.chart_texture {
                let response = ui.add(egui::Image::new(texture).sense(egui::Sense::hover()));
                if let Some(pos) = response.hover_pos() {
                    // Chart pixels per screen point
                    let scale = texture.size_vec2().x / response.rect.width().max(1.0);
                    let local = (pos - response.rect.min) * scale;
                    if let Some(text) = app.hovered_cell(local.x, local.y).map(cell_tooltip) {
                        response.on_hover_text_at_pointer(text);
                    }
                }
            } else if !app.is_loading {
                ui.label(tr(lang, TextKey::NoData));
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            let has_chart = app.chart.is_some();

            if ui.add_enabled(has_chart, Button::new(tr(lang, TextKey::CopyImage))).clicked() {
                let copied = app.copy_chart_image().map(|_| tr(lang, TextKey::Copied).to_string());
                report(app, copied);
            }
            if ui.add_enabled(has_chart, Button::new(tr(lang, TextKey::CopyShareText))).clicked() {
                let copied = app.copy_share_text().map(|_| tr(lang, TextKey::Copied).to_string());
                report(app, copied);
            }
            if ui.add_enabled(has_chart, Button::new(tr(lang, TextKey::SavePng))).clicked() {
                let saved = app.save_png().map(|path| saved_message(lang, &path));
                report(app, saved);
            }

            ui.separator();
            ui.label(tr(lang, TextKey::Share));
            for target in ShareTarget::ALL {
                if ui.add_enabled(has_chart, Button::new(target.label())).clicked() {
                    let shared = app.share_to(target).map(|_| String::new());
                    report(app, shared);
                }
            }
        });
    });

    let mut show_settings = app.show_settings;
    egui::Window::new(tr(lang, TextKey::Settings))
        .open(&mut show_settings)
        .resizable(false)
        .show(ctx, |ui| draw_settings(app, ui));
    app.show_settings = show_settings;
}

fn draw_settings(app: &mut App, ui: &mut egui::Ui) {
    let lang = app.settings.language;
    let before = app.settings.clone();

    ui.label(tr(lang, TextKey::ShareTemplate));
    ui.text_edit_multiline(&mut app.settings.share_text);
    ui.checkbox(&mut app.settings.share.include_total, tr(lang, TextKey::IncludeTotal));
    ui.checkbox(&mut app.settings.share.include_link, tr(lang, TextKey::IncludeLink));
    ui.checkbox(&mut app.settings.share.copy_image, tr(lang, TextKey::CopyImageWithText));

    ui.separator();
    ui.checkbox(&mut app.settings.chart.weekday_labels, tr(lang, TextKey::WeekdayLabels));
    ui.checkbox(&mut app.settings.chart.month_labels, tr(lang, TextKey::MonthLabels));
    ui.checkbox(&mut app.settings.chart.legend, tr(lang, TextKey::Legend));
    ui.checkbox(&mut app.settings.chart.total, tr(lang, TextKey::ShowTotal));

    ui.separator();
    ui.checkbox(&mut app.settings.fetch.use_browser, tr(lang, TextKey::UseBrowser));
    ui.horizontal(|ui| {
        ui.label(tr(lang, TextKey::BrowserPath));
        ui.text_edit_singleline(&mut app.settings.fetch.browser_path);
    });
    if ui
        .add_enabled(app.username.is_some(), Button::new(tr(lang, TextKey::ClearCache)))
        .clicked()
    {
        app.clear_cache();
    }

    if app.settings != before {
        if app.settings.chart != before.chart {
            app.update_needed = true;
        }
        if app.settings.fetch != before.fetch {
            app.reset_service();
        }
        app.save_settings();
    }
}

fn apply_theme(app: &mut App, ctx: &Context) {
    if app.applied_theme != Some(app.settings.theme) {
        let preference = match app.settings.theme {
            ThemePreference::System => egui::ThemePreference::System,
            ThemePreference::Light => egui::ThemePreference::Light,
            ThemePreference::Dark => egui::ThemePreference::Dark,
        };
        ctx.set_theme(preference);
        app.applied_theme = Some(app.settings.theme);
    }
    app.set_dark_mode(ctx.style().visuals.dark_mode);
}

fn start_load(app: &mut App, ctx: &Context, app_arc: &Arc<Mutex<App>>, selection: YearSelection, force: bool) {
    let pending = app.begin_load(selection, force);
    spawn_load(ctx, app_arc, pending);
}

fn spawn_load(ctx: &Context, app_arc: &Arc<Mutex<App>>, pending: Option<PendingLoad>) {
    let Some(PendingLoad {
        service,
        request,
        cancel,
        generation,
    }) = pending
    else {
        return;
    };

    let app_arc = Arc::clone(app_arc);
    let ctx = ctx.clone();
    tokio::spawn(async move {
        let result = service.load(request, &cancel).await;
        match app_arc.lock() {
            Ok(mut app) => app.finish_load(generation, result),
            Err(_) => error!(target: LOG_TARGET, "Failed to acquire app lock after load"),
        }
        ctx.request_repaint();
    });
}

fn handle_selection_change(app: &mut App, ctx: &Context, app_arc: &Arc<Mutex<App>>, selected: YearSelection) {
    if app.is_loaded(selected) {
        // Already in memory
        app.show_selection(selected);
    } else {
        let pending = app.begin_selection_load(selected);
        spawn_load(ctx, app_arc, pending);
    }
}

fn report(app: &mut App, result: crate::Result<String>) {
    match result {
        Ok(message) => {
            app.error_message = None;
            app.status_message = (!message.is_empty()).then_some(message);
        }
        Err(e) => {
            error!(target: LOG_TARGET, "{e}");
            app.error_message = Some(e.to_string());
        }
    }
}

fn selection_label(lang: Language, selection: YearSelection) -> String {
    match selection {
        YearSelection::Default => tr(lang, TextKey::DefaultView).to_string(),
        YearSelection::All => tr(lang, TextKey::AllYears).to_string(),
        YearSelection::Year(year) => year.to_string(),
    }
}

fn theme_label(lang: Language, theme: ThemePreference) -> &'static str {
    match theme {
        ThemePreference::System => tr(lang, TextKey::ThemeSystem),
        ThemePreference::Light => tr(lang, TextKey::ThemeLight),
        ThemePreference::Dark => tr(lang, TextKey::ThemeDark),
    }
}

fn saved_message(lang: Language, path: &Path) -> String {
    format!("{} {}", tr(lang, TextKey::Saved), path.display())
}

fn cell_tooltip(cell: &Cell) -> String {
    cell.tooltip
        .clone()
        .unwrap_or_else(|| cell.date.format("%Y-%m-%d").to_string())
}
