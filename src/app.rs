use eframe::egui;

use crate::predict::PredictionClient;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    pub client: PredictionClient,
}

impl DashboardApp {
    pub fn new(state: AppState, client: PredictionClient) -> Self {
        Self { state, client }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.ensure_loaded();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selector + predict ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.client);
            });

        // ---- Central panel: prediction, charts, rows ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.load_error.is_some() {
                panels::load_error(ui, &mut self.state);
                return;
            }

            ui.vertical_centered(|ui| {
                ui.heading("🌍 CO2 Emissions Predictor");
                ui.label(
                    "Select a country on the sidebar and click \"Predict\" to see if it will meet its environmental goals.",
                );
            });
            ui.separator();

            if let Some(message) = &self.state.prediction {
                panels::prediction(ui, message);
                ui.separator();
            }

            let co2 = self.state.co2_panel();
            let others = self.state.other_gases_panel();
            let chart_height = if self.state.show_rows { 280.0 } else { 420.0 };
            ui.columns(2, |cols| {
                cols[0].set_max_height(chart_height);
                plot::co2_chart(&mut cols[0], &co2);
                cols[1].set_max_height(chart_height);
                plot::other_gases_chart(&mut cols[1], &others);
            });

            if self.state.show_rows {
                if let Some(view) = &self.state.view {
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        table::rows(ui, view);
                    });
                }
            }
        });
    }
}
