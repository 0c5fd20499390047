use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::predict::PredictionOutcome;

const CONFIG_ENV: &str = "EMISSIONS_DASHBOARD_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "emissions-dashboard.toml";
const DEFAULT_ENDPOINT: &str = "https://co2project-vzzs3rfq7q-ew.a.run.app/predict";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// Everything the composition root needs. Every field has a default, so an
/// empty or absent config file yields a working setup.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataSources,
    pub prediction: PredictionConfig,
}

impl DashboardConfig {
    /// Resolve the config file (`$EMISSIONS_DASHBOARD_CONFIG`, then
    /// `./emissions-dashboard.toml`) and parse it; defaults if neither exists.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Where one gas table lives and what its columns are called.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
pub struct TableSource {
    pub path: PathBuf,
    pub country_column: String,
    #[serde(default = "default_year_column")]
    pub year_column: String,
    pub value_column: String,
}

fn default_year_column() -> String {
    "year".to_string()
}

impl TableSource {
    fn new(path: &str, country_column: &str, value_column: &str) -> Self {
        TableSource {
            path: PathBuf::from(path),
            country_column: country_column.to_string(),
            year_column: default_year_column(),
            value_column: value_column.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct DataSources {
    pub co2: TableSource,
    pub ch4: TableSource,
    pub n2o: TableSource,
}

impl Default for DataSources {
    fn default() -> Self {
        DataSources {
            co2: TableSource::new("data/CO2_simplified_by_name.xlsx", "country", "CO2"),
            ch4: TableSource::new("data/CH4_simplified.xlsx", "Name", "gas"),
            n2o: TableSource::new("data/N2O_simplified.xlsx", "Name", "gas"),
        }
    }
}

impl DataSources {
    /// Same file names and columns, but looked up inside `dir`.
    pub fn relocated(&self, dir: &Path) -> Self {
        let move_into = |src: &TableSource| {
            let mut moved = src.clone();
            if let Some(name) = src.path.file_name() {
                moved.path = dir.join(name);
            }
            moved
        };
        DataSources {
            co2: move_into(&self.co2),
            ch4: move_into(&self.ch4),
            n2o: move_into(&self.n2o),
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictionConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Countries answered locally without calling the endpoint.
    pub overrides: BTreeMap<String, PredictionOutcome>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        PredictionConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            overrides: BTreeMap::from([("Bhutan".to_string(), PredictionOutcome::Yes)]),
        }
    }
}

impl PredictionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = DashboardConfig::from_toml("").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.data.ch4.country_column, "Name");
        assert_eq!(cfg.data.co2.value_column, "CO2");
        assert_eq!(
            cfg.prediction.overrides.get("Bhutan"),
            Some(&PredictionOutcome::Yes)
        );
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let cfg = DashboardConfig::from_toml(
            r#"
            [prediction]
            endpoint = "http://localhost:8080/predict"
            timeout_secs = 5

            [prediction.overrides]
            Bhutan = "yes"
            Atlantis = "indeterminate"

            [data.co2]
            path = "fixtures/co2.csv"
            country_column = "Country"
            value_column = "Mt"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.prediction.endpoint, "http://localhost:8080/predict");
        assert_eq!(cfg.prediction.timeout(), Duration::from_secs(5));
        assert_eq!(
            cfg.prediction.overrides.get("Atlantis"),
            Some(&PredictionOutcome::Indeterminate)
        );
        assert_eq!(cfg.data.co2.path, PathBuf::from("fixtures/co2.csv"));
        assert_eq!(cfg.data.co2.year_column, "year");
        assert_eq!(cfg.data.n2o, DataSources::default().n2o);
    }

    #[test]
    fn unknown_outcome_is_rejected() {
        let err = DashboardConfig::from_toml(
            r#"
            [prediction.overrides]
            Bhutan = "probably"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn relocated_keeps_file_names() {
        let moved = DataSources::default().relocated(Path::new("/srv/emissions"));
        assert_eq!(
            moved.co2.path,
            PathBuf::from("/srv/emissions/CO2_simplified_by_name.xlsx")
        );
        assert_eq!(moved.ch4.country_column, "Name");
    }

    #[test]
    fn reads_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emissions-dashboard.toml");
        std::fs::write(&path, "[prediction]\ntimeout_secs = 2\n").unwrap();
        let cfg = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(cfg.prediction.timeout_secs, 2);
        assert_eq!(cfg.prediction.endpoint, DEFAULT_ENDPOINT);
    }
}
