use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Gas;

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

/// Fixed colour per gas: CO2 blue, CH4 green, N2O red.
pub fn gas_color(gas: Gas) -> Color32 {
    match gas {
        Gas::Co2 => from_hsl(210.0, 0.75, 0.55),
        Gas::Ch4 => from_hsl(120.0, 0.75, 0.45),
        Gas::N2o => from_hsl(0.0, 0.75, 0.55),
    }
}
