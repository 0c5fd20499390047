use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::color::gas_color;
use crate::state::ChartPanel;

// ---------------------------------------------------------------------------
// Emission charts
// ---------------------------------------------------------------------------

/// CO2 over time for the selected country.
pub fn co2_chart(ui: &mut Ui, panel: &ChartPanel) {
    ui.heading("CO2 Emissions Over Time");
    render(ui, "co2_plot", panel, false);
}

/// CH4 and N2O on a shared axis.
pub fn other_gases_chart(ui: &mut Ui, panel: &ChartPanel) {
    ui.heading("CH4 and N2O Emissions");
    render(ui, "other_gases_plot", panel, true);
}

fn render(ui: &mut Ui, id: &str, panel: &ChartPanel, with_markers: bool) {
    let series = match panel {
        ChartPanel::Series(series) => series,
        ChartPanel::NoData(message) => {
            ui.add_space(8.0);
            ui.label(RichText::new(format!("⚠ {message}")).color(Color32::RED));
            return;
        }
    };

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Emissions")
        .height(ui.available_height().max(240.0))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series {
                let color = gas_color(s.gas);
                let line = Line::new(PlotPoints::from(s.points.clone()))
                    .name(&s.name)
                    .color(color)
                    .width(1.5);
                plot_ui.line(line);

                // A single year would otherwise be invisible.
                if with_markers || s.points.len() == 1 {
                    let markers = Points::new(PlotPoints::from(s.points.clone()))
                        .name(&s.name)
                        .color(color)
                        .radius(3.0);
                    plot_ui.points(markers);
                }
            }
        });
}
