//! Short-lived notifications above the chart panel.

use eframe::egui;

use crate::app::SensorGridApp;

/// Distance from the window's bottom right corner
const TOAST_OFFSET: egui::Vec2 = egui::vec2(-20.0, -20.0);

fn rgb([r, g, b]: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

impl SensorGridApp {
    pub fn render_toast(&mut self, ctx: &egui::Context) {
        let Some((message, toast_type)) = self.state.active_toast() else {
            return;
        };

        egui::Area::new(egui::Id::new("toast"))
            .anchor(egui::Align2::RIGHT_BOTTOM, TOAST_OFFSET)
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(rgb(toast_type.color()))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(message)
                                .color(rgb(toast_type.text_color()))
                                .size(14.0),
                        );
                    });
            });

        // Nothing else may trigger a frame once the toast is due to vanish
        ctx.request_repaint_after(toast_type.duration() / 4);
    }
}
