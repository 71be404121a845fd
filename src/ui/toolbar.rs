//! Top toolbar: file loading, progress and status.

use eframe::egui;

use crate::app::SensorGridApp;
use crate::state::LoadingState;

impl SensorGridApp {
    /// Render the toolbar with the load button, progress bar and status line
    pub fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            let is_loading = self.state.is_loading();
            if ui
                .add_enabled(!is_loading, egui::Button::new("📂  Load CSV Data"))
                .clicked()
            {
                self.select_file();
            }

            ui.separator();

            match &self.state.loading_state {
                LoadingState::Loading(name, progress) => {
                    ui.spinner();
                    ui.label(format!(
                        "Loading {}... ({} batches)",
                        name, progress.batches
                    ));
                }
                LoadingState::Loaded(name) => {
                    ui.label(egui::RichText::new(name).strong());
                }
                LoadingState::Errored(name, kind) => {
                    ui.label(
                        egui::RichText::new(format!("{} ({})", name, kind))
                            .color(egui::Color32::from_rgb(191, 78, 48)),
                    );
                }
                LoadingState::Idle => {}
            }
        });

        let fraction = match &self.state.loading_state {
            LoadingState::Loading(_, progress) => progress.fraction(),
            LoadingState::Loaded(_) => 1.0,
            _ => 0.0,
        };
        ui.add(egui::ProgressBar::new(fraction).show_percentage());

        ui.label(
            egui::RichText::new(&self.state.status)
                .small()
                .color(egui::Color32::GRAY),
        );
        ui.add_space(4.0);
    }
}
