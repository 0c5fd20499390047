/// Goal prediction: a local table of known answers in front of a remote
/// yes/no endpoint.
pub mod client;
pub mod overrides;

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub use client::{HttpReply, PredictionClient, Transport, TransportError, UreqTransport};
pub use overrides::KnownOutcomes;

/// Answer to "will this country meet its environmental goals?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionOutcome {
    Yes,
    No,
    /// The service answered, but with something other than `true`/`false`.
    Indeterminate,
}

impl fmt::Display for PredictionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionOutcome::Yes => f.write_str("yes"),
            PredictionOutcome::No => f.write_str("no"),
            PredictionOutcome::Indeterminate => f.write_str("indeterminate"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredictionError {
    /// The endpoint answered with a status other than 200.
    #[error("prediction service returned HTTP {status}")]
    Service { status: u16 },
    /// The endpoint could not be reached at all.
    #[error("could not reach the prediction service: {detail}")]
    Connection { detail: String },
}
