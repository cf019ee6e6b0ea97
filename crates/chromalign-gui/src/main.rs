mod app;
mod convert;
mod messages;
mod panels;
mod state;
mod worker;

use std::path::PathBuf;

use clap::Parser;

/// Desktop tool for manually aligning image channels.
#[derive(Parser)]
#[command(name = "chromalign-gui", version)]
struct Cli {
    /// Image files to load on startup: one multi-page TIFF, one RGB image,
    /// or one grayscale file per channel
    paths: Vec<PathBuf>,
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Chromalign"),
        ..Default::default()
    };

    eframe::run_native(
        "Chromalign",
        options,
        Box::new(move |cc| Ok(Box::new(app::AlignApp::new(&cc.egui_ctx, cli.paths)))),
    )
}
