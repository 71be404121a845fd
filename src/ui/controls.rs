//! Side panel with plot selectors and category buttons.

use eframe::egui;
use strum::IntoEnumIterator;

use crate::app::SensorGridApp;
use crate::state::{Category, CategoryGroup, Excitation, X_AXIS_COLUMN};

impl SensorGridApp {
    /// Render the plot controls
    pub fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Plot");
        ui.separator();

        ui.label(
            egui::RichText::new(format!("X axis: {}", X_AXIS_COLUMN))
                .small()
                .color(egui::Color32::GRAY),
        );
        ui.add_space(4.0);

        ui.label("Measurement:");
        let choices = self.state.measurement_choices();
        egui::ComboBox::from_id_salt("measurement_column")
            .selected_text(self.state.measurement.as_str())
            .width(190.0)
            .show_ui(ui, |ui| {
                for name in choices {
                    ui.selectable_value(&mut self.state.measurement, name.clone(), name);
                }
            });

        ui.add_space(4.0);

        ui.label("Excitation:");
        egui::ComboBox::from_id_salt("excitation")
            .selected_text(self.state.excitation.to_string())
            .width(190.0)
            .show_ui(ui, |ui| {
                for excitation in Excitation::iter() {
                    ui.selectable_value(
                        &mut self.state.excitation,
                        excitation,
                        excitation.to_string(),
                    );
                }
            });

        ui.add_space(10.0);

        let mut clicked: Option<Category> = None;
        for group in CategoryGroup::iter() {
            ui.label(egui::RichText::new(group.to_string()).strong());
            for category in Category::iter().filter(|c| c.group() == group) {
                let button = egui::Button::new(category.to_string());
                if ui.add_sized([200.0, 26.0], button).clicked() {
                    clicked = Some(category);
                }
            }
            ui.add_space(8.0);
        }

        if let Some(category) = clicked {
            if let Err(e) = self.state.request_plot(category) {
                tracing::debug!("{} plot not drawn: {}", category, e);
            }
        }

        self.render_data_summary(ui);
    }

    /// Row/column counts and column kinds of the loaded table
    fn render_data_summary(&self, ui: &mut egui::Ui) {
        let Some(table) = self.state.display.table() else {
            return;
        };

        ui.separator();
        ui.label(
            egui::RichText::new(format!(
                "{} rows | {} columns",
                table.row_count(),
                table.column_count()
            ))
            .small()
            .color(egui::Color32::GRAY),
        );

        egui::ScrollArea::vertical()
            .id_salt("column_summary")
            .show(ui, |ui| {
                let kinds = self.state.display.column_kinds();
                for (column, kind) in table.columns.iter().zip(kinds) {
                    ui.label(egui::RichText::new(format!("{} ({})", column.name, kind)).small());
                }
            });
    }
}
