use eframe::egui;
use tracing_subscriber::EnvFilter;

use sensorgrid::app::SensorGridApp;
use sensorgrid::config::AppConfig;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 600.0])
            .with_min_inner_size([700.0, 450.0])
            .with_title("Advanced CSV Analyzer")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "SensorGrid",
        options,
        Box::new(move |cc| Ok(Box::new(SensorGridApp::new(cc, config)))),
    )
}
