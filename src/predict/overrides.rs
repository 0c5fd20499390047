use std::collections::BTreeMap;

use super::PredictionOutcome;

/// Countries whose answer is known up front. A listed country is answered
/// from this table and the remote endpoint is never called for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownOutcomes {
    outcomes: BTreeMap<String, PredictionOutcome>,
}

impl KnownOutcomes {
    pub fn new(outcomes: BTreeMap<String, PredictionOutcome>) -> Self {
        KnownOutcomes { outcomes }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, country: &str) -> Option<PredictionOutcome> {
        self.outcomes.get(country).copied()
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.outcomes.keys().map(String::as_str)
    }
}

impl FromIterator<(String, PredictionOutcome)> for KnownOutcomes {
    fn from_iter<I: IntoIterator<Item = (String, PredictionOutcome)>>(iter: I) -> Self {
        KnownOutcomes::new(iter.into_iter().collect())
    }
}
