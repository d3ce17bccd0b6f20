//! Blocking HTTP transport for the directory client.
//!
//! One GET per operation, full body read, connection released by the
//! agent's RAII types on every exit path — including when the connection
//! never opened.

use crate::error::ApiError;

/// Thin wrapper around a `ureq::Agent` issuing one blocking GET per call.
///
/// The directory backend answers 200 with a JSON array on every endpoint,
/// so non-success statuses are left to the agent's default status-as-error
/// behavior and surface as [`ApiError::Transport`] rather than as parseable
/// answers.
#[derive(Clone)]
pub struct Transport {
    agent: ureq::Agent,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    /// GET `url` and return the response body as text.
    pub fn get(&self, url: &str) -> Result<String, ApiError> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
