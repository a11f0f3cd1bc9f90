//! LinkBio Studio - link-in-bio page builder
//!
//! Edit a profile and its links on the left, see the page live on the right
//! in a phone mockup or full width.

mod app;
mod core;
mod ui;

use app::LinkBioApp;
use crate::core::config::AppConfig;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting LinkBio Studio...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default config: {}", e);
        AppConfig::default()
    });

    // File loading runs here, off the UI thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("linkbio-io")
        .enable_all()
        .build()?;
    let handle = runtime.handle().clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([900.0, 640.0])
            .with_title("LinkBio Studio"),
        ..Default::default()
    };

    eframe::run_native(
        "LinkBio Studio",
        native_options,
        Box::new(move |cc| Ok(Box::new(LinkBioApp::new(cc, handle, config)))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))
}
