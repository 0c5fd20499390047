use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Gas – which emission table a dataset belongs to
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gas {
    Co2,
    Ch4,
    N2o,
}

impl Gas {
    pub const ALL: [Gas; 3] = [Gas::Co2, Gas::Ch4, Gas::N2o];

    pub fn label(self) -> &'static str {
        match self {
            Gas::Co2 => "CO2",
            Gas::Ch4 => "CH4",
            Gas::N2o => "N2O",
        }
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// EmissionRecord – one row of a source table, already normalized
// ---------------------------------------------------------------------------

/// One (country, year, value) row. Field names are canonical regardless of
/// what the source file called its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRecord {
    pub country: String,
    pub year: i64,
    /// `NaN` when the source cell was empty.
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Dataset – the ordered rows of one gas table
// ---------------------------------------------------------------------------

/// All rows of one gas table, in source order. Duplicate (country, year)
/// pairs are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub gas: Gas,
    pub records: Vec<EmissionRecord>,
}

impl Dataset {
    pub fn new(gas: Gas, records: Vec<EmissionRecord>) -> Self {
        Dataset { gas, records }
    }

    /// Distinct country names in order of first appearance.
    pub fn countries(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.country.as_str()))
            .map(|r| r.country.clone())
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// EmissionTables – the three datasets loaded together
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EmissionTables {
    pub co2: Dataset,
    pub ch4: Dataset,
    pub n2o: Dataset,
}

impl EmissionTables {
    pub fn get(&self, gas: Gas) -> &Dataset {
        match gas {
            Gas::Co2 => &self.co2,
            Gas::Ch4 => &self.ch4,
            Gas::N2o => &self.n2o,
        }
    }

    /// Values offered by the country selector.
    pub fn country_options(&self) -> Vec<String> {
        self.co2.countries()
    }
}

// ---------------------------------------------------------------------------
// DataError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("data unavailable: {}: {reason}", path.display())]
    Unavailable { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country: &str, year: i64, value: f64) -> EmissionRecord {
        EmissionRecord {
            country: country.to_string(),
            year,
            value,
        }
    }

    #[test]
    fn countries_keep_first_appearance_order() {
        let ds = Dataset::new(
            Gas::Co2,
            vec![
                rec("Norway", 2019, 1.0),
                rec("Chile", 2019, 2.0),
                rec("Norway", 2020, 3.0),
                rec("Bhutan", 2020, 0.5),
            ],
        );
        assert_eq!(ds.countries(), vec!["Norway", "Chile", "Bhutan"]);
    }

    #[test]
    fn unavailable_error_names_the_file() {
        let err = DataError::Unavailable {
            path: PathBuf::from("data/CH4_simplified.xlsx"),
            reason: "missing column 'Name'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "data unavailable: data/CH4_simplified.xlsx: missing column 'Name'"
        );
    }
}
