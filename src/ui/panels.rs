use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Gas;
use crate::predict::{PredictionClient, Transport};
use crate::state::{AppState, PredictionMessage, Tone};

// ---------------------------------------------------------------------------
// Left side panel – country selector and predict action
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel<T: Transport>(ui: &mut Ui, state: &mut AppState, client: &PredictionClient<T>) {
    ui.heading("Filters");
    ui.separator();

    if state.tables.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ui.strong("Select a country");
    let current = state.selected_country().unwrap_or_default().to_string();
    let mut chosen = None;
    egui::ComboBox::from_id_salt("country_select")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ScrollArea::vertical().max_height(400.0).show(ui, |ui: &mut Ui| {
                for country in &state.countries {
                    if ui.selectable_label(current == *country, country).clicked() {
                        chosen = Some(country.clone());
                    }
                }
            });
        });
    if let Some(country) = chosen {
        state.select_country(&country);
    }

    ui.add_space(12.0);
    let can_predict = state.selected_country().is_some();
    if ui
        .add_enabled(can_predict, egui::Button::new("🚀 Predict"))
        .clicked()
    {
        state.predict_selected(client);
    }

    ui.add_space(12.0);
    ui.checkbox(&mut state.show_rows, "Show data rows");
}

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

pub fn prediction(ui: &mut Ui, message: &PredictionMessage) {
    ui.heading(&message.question);
    let (icon, color) = match message.tone {
        Tone::Success => ("✅", Color32::from_rgb(60, 180, 75)),
        Tone::Warning => ("⚠", Color32::from_rgb(230, 160, 0)),
        Tone::Error => ("❌", Color32::RED),
    };
    ui.label(RichText::new(format!("{icon} {}", message.text)).color(color).size(16.0));
    if let Some(detail) = &message.detail {
        ui.label(RichText::new(format!("Exception: {detail}")).monospace());
    }
}

// ---------------------------------------------------------------------------
// Load failure notice
// ---------------------------------------------------------------------------

pub fn load_error(ui: &mut Ui, state: &mut AppState) {
    let Some(err) = &state.load_error else {
        return;
    };
    let text = err.to_string();
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading("No data available");
        ui.label(RichText::new(text).color(Color32::RED));
        ui.add_space(8.0);
        if ui.button("Reload").clicked() {
            state.reload();
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(tables) = &state.tables {
            let counts: Vec<String> = Gas::ALL
                .iter()
                .map(|&gas| format!("{} {gas}", tables.get(gas).len()))
                .collect();
            ui.label(format!(
                "{} countries, {} rows",
                state.countries.len(),
                counts.join(" / ")
            ));
        }

        if let Some(country) = state.selected_country() {
            ui.separator();
            ui.label(RichText::new(format!("Country selected: {country}")).strong());
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open emissions data folder")
        .pick_folder();

    if let Some(dir) = folder {
        state.relocate(&dir);
    }
}
