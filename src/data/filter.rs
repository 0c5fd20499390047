use super::model::{Dataset, EmissionTables, Gas};

// ---------------------------------------------------------------------------
// Country filter
// ---------------------------------------------------------------------------

/// Rows of `dataset` whose country equals `country`, in their original order.
/// An empty result means "no data for this country", not an error.
pub fn filter_by_country(dataset: &Dataset, country: &str) -> Dataset {
    Dataset {
        gas: dataset.gas,
        records: dataset
            .records
            .iter()
            .filter(|r| r.country == country)
            .cloned()
            .collect(),
    }
}

/// All three tables projected onto one selected country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryView {
    pub country: String,
    pub co2: Dataset,
    pub ch4: Dataset,
    pub n2o: Dataset,
}

impl CountryView {
    pub fn new(tables: &EmissionTables, country: &str) -> Self {
        CountryView {
            country: country.to_string(),
            co2: filter_by_country(&tables.co2, country),
            ch4: filter_by_country(&tables.ch4, country),
            n2o: filter_by_country(&tables.n2o, country),
        }
    }

    pub fn get(&self, gas: Gas) -> &Dataset {
        match gas {
            Gas::Co2 => &self.co2,
            Gas::Ch4 => &self.ch4,
            Gas::N2o => &self.n2o,
        }
    }
}
