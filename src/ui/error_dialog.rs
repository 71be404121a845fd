//! Modal error notification.

use eframe::egui;

use crate::app::SensorGridApp;

impl SensorGridApp {
    /// Show the pending error message, if any, until dismissed
    pub fn render_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state.error_message.clone() else {
            return;
        };

        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("error_dialog")).show(ctx, |ui| {
            ui.set_width(380.0);

            ui.label(
                egui::RichText::new("Error occurred!")
                    .size(18.0)
                    .strong()
                    .color(egui::Color32::from_rgb(191, 78, 48)),
            );
            ui.add_space(10.0);
            ui.label(message);
            ui.add_space(15.0);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

        if dismissed || modal.should_close() {
            self.state.error_message = None;
        }
    }
}
