use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::filter::CountryView;
use crate::data::model::{Dataset, Gas};

/// Filtered rows of each gas, one collapsible table per gas.
pub fn rows(ui: &mut Ui, view: &CountryView) {
    for gas in Gas::ALL {
        let dataset = view.get(gas);
        let title = format!("{} rows ({})", dataset.gas, dataset.len());
        ui.collapsing(title, |ui: &mut Ui| {
            if dataset.is_empty() {
                ui.label("No data available.");
            } else {
                ui.push_id(gas.label(), |ui: &mut Ui| rows_table(ui, dataset));
            }
        });
    }
}

fn rows_table(ui: &mut Ui, dataset: &Dataset) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .max_scroll_height(240.0)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("Year");
            });
            header.col(|ui| {
                ui.strong(dataset.gas.label());
            });
        })
        .body(|body| {
            body.rows(18.0, dataset.len(), |mut row| {
                let record = &dataset.records[row.index()];
                row.col(|ui| {
                    ui.label(&record.country);
                });
                row.col(|ui| {
                    ui.label(record.year.to_string());
                });
                row.col(|ui| {
                    if record.value.is_nan() {
                        ui.weak("—");
                    } else {
                        ui.label(format!("{:.4}", record.value));
                    }
                });
            });
        });
}
