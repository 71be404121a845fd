//! Chart rendering.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::app::SensorGridApp;
use crate::state::CHART_COLOR;

impl SensorGridApp {
    /// Render the last successful plot request
    pub fn render_chart(&mut self, ui: &mut egui::Ui) {
        let Some(chart) = self.state.display.chart() else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("Choose a category to plot RPM against a measurement")
                        .size(16.0)
                        .color(egui::Color32::GRAY),
                );
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&chart.title).strong());
            if chart.points.len() < chart.source_points {
                ui.label(
                    egui::RichText::new(format!(
                        "showing {} of {} points",
                        chart.points.len(),
                        chart.source_points
                    ))
                    .small()
                    .color(egui::Color32::GRAY),
                );
            }
        });

        let color = egui::Color32::from_rgb(CHART_COLOR[0], CHART_COLOR[1], CHART_COLOR[2]);
        let points = PlotPoints::from(chart.points.clone());

        // Fresh plot memory per axis pair so bounds fit the new data
        Plot::new(("measurement_chart", &chart.x_label, &chart.y_label))
            .legend(Legend::default())
            .x_axis_label(chart.x_label.clone())
            .y_axis_label(chart.y_label.clone())
            .allow_boxed_zoom(true)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(chart.y_label.clone(), points)
                        .color(color)
                        .width(1.5),
                );
            });
    }
}
