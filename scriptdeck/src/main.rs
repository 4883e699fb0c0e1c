//! scriptdeck: a floating deck of buttons that run shell functions
//!
//! Actions come from the script files listed in settings (`files/` under
//! the base directory); backgrounds and the icon come from `assets/`.
//! Anything wrong with the scripts stops startup before a window opens.

mod app;
mod background;
mod window;

use anyhow::Context as _;
use app::DeckApp;
use deckcore::pool::discover_assets;
use deckcore::settings::{assets_dir, base_dir, scripts_dir};
use deckcore::{Controller, Registry, Settings};
use eframe::NativeOptions;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    init_tracing();
    setup_panic_handler();

    let settings = Settings::load().context("failed to load settings")?;
    let base = base_dir();
    let scripts = scripts_dir(&base);
    let assets = assets_dir(&base);
    tracing::info!(base = %base.display(), "starting scriptdeck");

    let registry = Registry::from_scripts(&scripts, &settings.scripts, &settings.shell)
        .with_context(|| format!("failed to load actions from {}", scripts.display()))?;

    let animations = match discover_assets(&assets, &settings.animation_extension) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "no background animations");
            Vec::new()
        }
    };
    let controller = Controller::new(registry, animations);

    let mut viewport = egui::ViewportBuilder::default()
        .with_title(settings.title.clone())
        .with_inner_size([settings.window_width, settings.window_height])
        .with_resizable(false)
        .with_maximize_button(false)
        .with_window_level(egui::WindowLevel::AlwaysOnTop);
    if let Some(icon) = load_icon(&assets.join(&settings.icon)) {
        viewport = viewport.with_icon(icon);
    }
    let options = NativeOptions {
        viewport,
        ..Default::default()
    };

    let title = settings.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(DeckApp::new(cc, controller, &settings))),
    )
    .map_err(|e| anyhow::anyhow!("window system error: {}", e))?;

    tracing::info!("clean shutdown");
    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Route panics through the log, with location and backtrace.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = deckcore::safety::panic_message(panic_info.payload());
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());
        let thread = std::thread::current().name().unwrap_or("unnamed").to_string();

        tracing::error!(%location, %thread, "panic: {}", msg);

        let backtrace = std::backtrace::Backtrace::capture();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            tracing::error!("backtrace:\n{}", backtrace);
        }
    }));
}

/// Window icon, if the file is there and decodes.
fn load_icon(path: &Path) -> Option<egui::IconData> {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "no window icon");
            return None;
        }
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Some(egui::IconData { rgba: rgba.into_raw(), width, height })
}
