use std::path::Path;
use std::sync::Arc;

use crate::data::cache::DatasetCache;
use crate::data::filter::CountryView;
use crate::data::model::{DataError, Dataset, EmissionTables, Gas};
use crate::predict::{PredictionClient, PredictionError, PredictionOutcome, Transport};

pub const NO_CO2_DATA: &str = "No data available for this country.";
pub const NO_OTHER_GAS_DATA: &str = "No data available for CH4 and N2O emissions.";

// ---------------------------------------------------------------------------
// Chart content, independent of the plotting library
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub gas: Gas,
    pub name: String,
    /// `[year, value]`; rows with an empty value are skipped.
    pub points: Vec<[f64; 2]>,
}

impl ChartSeries {
    fn from_dataset(dataset: &Dataset, name: &str) -> Self {
        ChartSeries {
            gas: dataset.gas,
            name: name.to_string(),
            points: dataset
                .records
                .iter()
                .filter(|r| !r.value.is_nan())
                .map(|r| [r.year as f64, r.value])
                .collect(),
        }
    }
}

/// What one chart area shows: some series, or an explicit empty-state notice.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartPanel {
    Series(Vec<ChartSeries>),
    NoData(&'static str),
}

// ---------------------------------------------------------------------------
// Prediction message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionMessage {
    pub question: String,
    pub tone: Tone,
    pub text: String,
    /// Underlying failure, shown for connection errors.
    pub detail: Option<String>,
}

impl PredictionMessage {
    pub fn new(country: &str, result: Result<PredictionOutcome, PredictionError>) -> Self {
        let (tone, text, detail) = match result {
            Ok(PredictionOutcome::Yes) => (
                Tone::Success,
                "Yes, this country is on track to meet its goals.",
                None,
            ),
            Ok(PredictionOutcome::No) => (
                Tone::Error,
                "No, this country is unlikely to meet its goals.",
                None,
            ),
            Ok(PredictionOutcome::Indeterminate) => (
                Tone::Warning,
                "Unexpected response from the prediction model.",
                None,
            ),
            Err(PredictionError::Service { .. }) => (
                Tone::Error,
                "API error: Unable to fetch predictions. Please try again later.",
                None,
            ),
            Err(PredictionError::Connection { detail }) => (
                Tone::Error,
                "Connection error: Could not reach the prediction service.",
                Some(detail),
            ),
        };
        PredictionMessage {
            question: format!("Will {country} reach its environmental goals for CO2?"),
            tone,
            text: text.to_string(),
            detail,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    cache: DatasetCache,

    /// Loaded tables (None until the first successful load).
    pub tables: Option<Arc<EmissionTables>>,

    /// Last load failure; cleared by [`AppState::reload`].
    pub load_error: Option<DataError>,

    /// Selector options: distinct CO2 countries in file order.
    pub countries: Vec<String>,

    /// Current selection projected onto all three tables.
    pub view: Option<CountryView>,

    /// Result of the last "Predict" press for the current selection.
    pub prediction: Option<PredictionMessage>,

    /// Whether the raw rows table is expanded.
    pub show_rows: bool,
}

impl AppState {
    pub fn new(cache: DatasetCache) -> Self {
        Self {
            cache,
            tables: None,
            load_error: None,
            countries: Vec::new(),
            view: None,
            prediction: None,
            show_rows: false,
        }
    }

    /// Load through the cache unless already loaded or already failed.
    /// Called every frame, so a failure is not retried until `reload`.
    pub fn ensure_loaded(&mut self) {
        if self.tables.is_some() || self.load_error.is_some() {
            return;
        }
        match self.cache.get_or_load() {
            Ok(tables) => self.set_tables(tables),
            Err(e) => {
                log::error!("{e}");
                self.load_error = Some(e);
            }
        }
    }

    /// Read the files again, through a fresh cache. The selected country is
    /// kept if it is still present.
    pub fn reload(&mut self) {
        let selected = self.selected_country().map(str::to_string);
        log::info!("Reloading emission tables");
        self.cache = self.cache.reloaded();
        self.tables = None;
        self.load_error = None;
        self.countries.clear();
        self.view = None;
        self.prediction = None;
        self.ensure_loaded();
        if let Some(country) = selected.filter(|c| self.countries.contains(c)) {
            self.select_country(&country);
        }
    }

    /// Point at the same file names inside another directory.
    pub fn relocate(&mut self, dir: &Path) {
        let sources = self.cache.sources().relocated(dir);
        log::info!("Reading emission tables from {}", dir.display());
        self.cache = DatasetCache::new(sources);
        self.tables = None;
        self.load_error = None;
        self.countries.clear();
        self.view = None;
        self.prediction = None;
        self.ensure_loaded();
    }

    fn set_tables(&mut self, tables: Arc<EmissionTables>) {
        self.countries = tables.country_options();
        let first = self.countries.first().cloned();
        self.tables = Some(tables);
        self.view = None;
        if let Some(country) = first {
            self.select_country(&country);
        }
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.view.as_ref().map(|v| v.country.as_str())
    }

    /// Change the selection. A previous prediction belongs to the old
    /// country and is dropped.
    pub fn select_country(&mut self, country: &str) {
        if self.selected_country() == Some(country) {
            return;
        }
        if let Some(tables) = &self.tables {
            self.view = Some(CountryView::new(tables, country));
            self.prediction = None;
        }
    }

    /// Run the prediction for the current selection and keep the message.
    pub fn predict_selected<T: Transport>(&mut self, client: &PredictionClient<T>) {
        let Some(country) = self.selected_country().map(str::to_string) else {
            return;
        };
        let result = client.predict(&country);
        self.prediction = Some(PredictionMessage::new(&country, result));
    }

    /// CO2 line chart for the selection.
    pub fn co2_panel(&self) -> ChartPanel {
        match &self.view {
            Some(view) if !view.co2.is_empty() => {
                ChartPanel::Series(vec![ChartSeries::from_dataset(&view.co2, &view.country)])
            }
            _ => ChartPanel::NoData(NO_CO2_DATA),
        }
    }

    /// Combined CH4 / N2O chart; one series per gas that has rows.
    pub fn other_gases_panel(&self) -> ChartPanel {
        let Some(view) = &self.view else {
            return ChartPanel::NoData(NO_OTHER_GAS_DATA);
        };
        let series: Vec<ChartSeries> = [&view.ch4, &view.n2o]
            .into_iter()
            .filter(|ds| !ds.is_empty())
            .map(|ds| ChartSeries::from_dataset(ds, ds.gas.label()))
            .collect();
        if series.is_empty() {
            ChartPanel::NoData(NO_OTHER_GAS_DATA)
        } else {
            ChartPanel::Series(series)
        }
    }
}
