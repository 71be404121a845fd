use eframe::egui;
use std::time::Duration;

use crate::config::AppConfig;
use crate::state::AppState;

/// Main application: owns the [`AppState`] and drives it from the UI loop
pub struct SensorGridApp {
    pub(crate) state: AppState,
}

impl SensorGridApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let startup_path = config.startup_path.clone();
        let mut state = AppState::new(config);

        if let Some(path) = startup_path {
            tracing::info!("Loading startup file {}", path.display());
            state.start_load(path);
        }

        Self { state }
    }

    /// Prompt for a file and start loading it
    pub fn select_file(&mut self) {
        match rfd::FileDialog::new()
            .set_title("Open CSV file")
            .add_filter("CSV Files", &["csv", "txt", "tsv"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            Some(path) => {
                self.state.start_load(path);
            }
            None => self.state.file_not_selected(),
        }
    }

    /// Load the first file dropped onto the window
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|f| f.path) {
            self.state.start_load(path);
        }
    }
}

impl eframe::App for SensorGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_loader();
        self.handle_dropped_files(ctx);

        // Keep polling the loader channel while a worker is running
        if self.state.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| {
                self.render_controls(ui);
            });

        egui::TopBottomPanel::bottom("chart_panel")
            .resizable(true)
            .default_height(320.0)
            .min_height(160.0)
            .show(ctx, |ui| {
                self.render_chart(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_grid(ui);
        });

        self.render_error_dialog(ctx);
        self.render_toast(ctx);
    }
}
