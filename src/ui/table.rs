use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::view::PreviewTable;

const ROW_HEIGHT: f32 = 18.0;

/// Render the bounded raw-data preview.
pub fn preview(ui: &mut Ui, table: &PreviewTable) {
    if table.rows.is_empty() {
        ui.label("No rows to show.");
        return;
    }

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(180.0).clip(true))
            .columns(Column::auto().at_least(60.0), table.columns.len().saturating_sub(1))
            .min_scrolled_height(0.0)
            .max_scroll_height(400.0)
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}
