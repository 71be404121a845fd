//! Data grid rendering.

use eframe::egui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::app::SensorGridApp;

impl SensorGridApp {
    /// Render the loaded table. Only visible rows are laid out.
    pub fn render_grid(&mut self, ui: &mut egui::Ui) {
        let Some(table) = self.state.display.table() else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("Load a CSV file to view its data")
                        .size(20.0)
                        .color(egui::Color32::GRAY),
                );
            });
            return;
        };

        let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;

        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(TableColumn::auto().at_least(48.0))
                .columns(
                    TableColumn::initial(110.0).at_least(40.0).clip(true),
                    table.column_count(),
                )
                .header(row_height, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for column in &table.columns {
                        header.col(|ui| {
                            ui.strong(column.name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_height, table.row_count(), |mut row| {
                        let index = row.index();
                        row.col(|ui| {
                            ui.label(
                                egui::RichText::new((index + 1).to_string())
                                    .color(egui::Color32::GRAY),
                            );
                        });
                        for column in &table.columns {
                            row.col(|ui| {
                                if let Some(value) = column.values.get(index) {
                                    ui.label(value.to_string());
                                }
                            });
                        }
                    });
                });
        });
    }
}
