//! GitHub Contribution Graph Viewer
//!
//! A GUI application that scrapes and paints GitHub contribution calendars.

use anyhow::Context as _;
use eframe::egui;
use env_logger::Env;
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

use contribgraph::app::{ui, App, AppWrapper};
use contribgraph::settings::UserSettings;

fn main() -> anyhow::Result<()> {
    let default_level = if cfg!(feature = "dev") { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().filter_or("RUST_LOG", default_level))
        .format_timestamp(None)
        .init();

    let settings_path = UserSettings::default_path();
    let settings = settings_path
        .as_deref()
        .map(UserSettings::load)
        .unwrap_or_default();
    let app = Arc::new(Mutex::new(App::new(settings, settings_path)));

    // Initialize the Tokio runtime
    let rt = Runtime::new().context("failed to start the async runtime")?;
    rt.block_on(async {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([960.0, 420.0])
                .with_min_inner_size([640.0, 320.0])
                .with_title("GitHub Contributions"),
            ..Default::default()
        };

        let ui_app = Arc::clone(&app);
        eframe::run_native(
            "GitHub Contributions",
            options,
            Box::new(move |cc| {
                ui::configure_fonts(&cc.egui_ctx);
                Ok(Box::new(AppWrapper { app: ui_app }) as Box<dyn eframe::App>)
            }),
        )
    })
    .map_err(|e| anyhow::anyhow!("error running application: {e}"))?;

    if let Ok(app) = app.lock() {
        app.save_settings();
    }
    Ok(())
}
