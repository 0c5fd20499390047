use std::fmt;

use super::{KnownOutcomes, PredictionError, PredictionOutcome};
use crate::config::PredictionConfig;

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// The request never produced a response (refused, DNS, timeout, broken body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Blocking HTTP GET.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply, TransportError>;
}

/// [`Transport`] backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &PredictionConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .build();
        UreqTransport { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply, TransportError> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        // ureq reports 4xx/5xx as errors; fold them back into a reply.
        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => return Err(TransportError(err.to_string())),
        };
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| TransportError(format!("reading response body: {e}")))?;
        Ok(HttpReply { status, body })
    }
}

// ---------------------------------------------------------------------------
// PredictionClient
// ---------------------------------------------------------------------------

pub struct PredictionClient<T = UreqTransport> {
    endpoint: String,
    known: KnownOutcomes,
    transport: T,
}

impl PredictionClient<UreqTransport> {
    pub fn new(config: &PredictionConfig) -> Self {
        PredictionClient::with_transport(
            config.endpoint.clone(),
            KnownOutcomes::new(config.overrides.clone()),
            UreqTransport::new(config),
        )
    }
}

impl<T: Transport> PredictionClient<T> {
    pub fn with_transport(endpoint: String, known: KnownOutcomes, transport: T) -> Self {
        for country in known.countries() {
            log::debug!("Prediction for {country} is answered locally");
        }
        PredictionClient {
            endpoint,
            known,
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask whether `country` will meet its goals.
    ///
    /// Countries in the known-outcome table are answered locally. Everyone
    /// else costs exactly one `GET <endpoint>?country=<country>`; there is no
    /// retry and no caching.
    pub fn predict(&self, country: &str) -> Result<PredictionOutcome, PredictionError> {
        if let Some(outcome) = self.known.lookup(country) {
            log::info!("Prediction for {country} answered locally: {outcome}");
            return Ok(outcome);
        }

        let reply = self
            .transport
            .get(&self.endpoint, &[("country", country)])
            .map_err(|e| {
                log::error!("Prediction request for {country} failed: {e}");
                PredictionError::Connection { detail: e.0 }
            })?;

        if reply.status != 200 {
            log::error!(
                "Prediction service returned HTTP {} for {country}",
                reply.status
            );
            return Err(PredictionError::Service {
                status: reply.status,
            });
        }

        let outcome = interpret_body(&reply.body);
        if outcome == PredictionOutcome::Indeterminate {
            log::warn!(
                "Unexpected prediction response for {country}: {:?}",
                reply.body
            );
        } else {
            log::info!("Prediction for {country}: {outcome}");
        }
        Ok(outcome)
    }
}

/// `"true"` / `"false"`, ignoring case and surrounding whitespace.
pub fn interpret_body(body: &str) -> PredictionOutcome {
    match body.trim().to_lowercase().as_str() {
        "true" => PredictionOutcome::Yes,
        "false" => PredictionOutcome::No,
        _ => PredictionOutcome::Indeterminate,
    }
}
