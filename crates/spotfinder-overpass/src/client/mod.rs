//! HTTP client for Overpass interpreters with ordered endpoint failover.

mod failover;

use std::time::Duration;

use reqwest::Client;

use crate::error::OverpassError;
use crate::types::{OverpassResponse, RawElement};

pub use failover::FailoverState;

/// Client for a fixed, ordered list of equivalent Overpass endpoints.
///
/// Endpoints are tried one at a time in priority order. Each attempt is bounded
/// by its own timeout; a timeout, a non-2xx status, a transport error or an
/// unparseable body moves on to the next endpoint. Only the last error is
/// returned once every endpoint has failed.
pub struct OverpassClient {
    client: Client,
    endpoints: Vec<String>,
    attempt_timeout: Duration,
}

impl OverpassClient {
    /// Creates a client for `endpoints` with a per-attempt timeout of
    /// `timeout_secs`.
    ///
    /// # Errors
    ///
    /// - [`OverpassError::NoEndpoints`] if `endpoints` is empty.
    /// - [`OverpassError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        endpoints: Vec<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, OverpassError> {
        if endpoints.is_empty() {
            return Err(OverpassError::NoEndpoints);
        }
        let attempt_timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(attempt_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoints,
            attempt_timeout,
        })
    }

    /// Overrides the per-attempt timeout; used by tests to keep timeouts short.
    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Runs `query` against the endpoints in order and returns the elements
    /// from the first one that answers.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempted endpoint when all of them
    /// fail: [`OverpassError::Timeout`], [`OverpassError::UnexpectedStatus`],
    /// [`OverpassError::Http`] or [`OverpassError::Deserialize`].
    pub async fn fetch(&self, query: &str) -> Result<Vec<RawElement>, OverpassError> {
        let mut state = FailoverState::start(self.endpoints.len());
        let mut last_err = None;
        let mut fetched = Vec::new();

        loop {
            match state {
                FailoverState::Trying(index) => {
                    let Some(endpoint) = self.endpoints.get(index) else {
                        state = FailoverState::Exhausted;
                        continue;
                    };
                    match self.attempt(endpoint, query).await {
                        Ok(elements) => {
                            tracing::debug!(
                                endpoint = %endpoint,
                                elements = elements.len(),
                                "geodata fetch succeeded"
                            );
                            fetched = elements;
                            state = state.on_success();
                        }
                        Err(err) => {
                            tracing::warn!(
                                endpoint = %endpoint,
                                attempt = index + 1,
                                error = %err,
                                "geodata endpoint failed; trying next"
                            );
                            last_err = Some(err);
                            state = state.on_failure(self.endpoints.len());
                        }
                    }
                }
                FailoverState::Success => return Ok(fetched),
                FailoverState::Exhausted => {
                    return Err(last_err.unwrap_or(OverpassError::NoEndpoints));
                }
            }
        }
    }

    async fn attempt(&self, endpoint: &str, query: &str) -> Result<Vec<RawElement>, OverpassError> {
        match tokio::time::timeout(self.attempt_timeout, self.post_query(endpoint, query)).await {
            Ok(result) => result,
            Err(_) => Err(OverpassError::Timeout {
                endpoint: endpoint.to_owned(),
                timeout_ms: self.attempt_timeout.as_millis(),
            }),
        }
    }

    async fn post_query(&self, endpoint: &str, query: &str) -> Result<Vec<RawElement>, OverpassError> {
        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OverpassError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint.to_owned(),
            });
        }

        let body = response.text().await?;
        parse_response(&body, endpoint)
    }
}

/// Parses an interpreter response body; a missing `elements` array is empty.
pub(crate) fn parse_response(body: &str, endpoint: &str) -> Result<Vec<RawElement>, OverpassError> {
    let parsed: OverpassResponse =
        serde_json::from_str(body).map_err(|source| OverpassError::Deserialize {
            context: format!("interpreter response from {endpoint}"),
            source,
        })?;
    Ok(parsed.elements)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
