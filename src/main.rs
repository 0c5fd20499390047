mod app;
mod color;
mod config;
mod data;
mod predict;
mod state;
mod ui;

use anyhow::anyhow;
use app::DashboardApp;
use config::DashboardConfig;
use data::cache::DatasetCache;
use eframe::egui;
use predict::PredictionClient;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;
    let cache = DatasetCache::new(config.data.clone());
    let client = PredictionClient::new(&config.prediction);
    log::info!("Prediction endpoint: {}", client.endpoint());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CO2 Emissions Predictor",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(AppState::new(cache), client)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
