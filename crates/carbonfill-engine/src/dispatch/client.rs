//! HTTP dispatcher: one pooled client, connection retry, and pacing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use carbonfill_types::Outcome;
use serde_json::Value;

use super::classify::classify_failure;
use super::retry::{BackoffPolicy, RetryPolicy};
use crate::config::types::{DispatchConfig, ServiceConfig};

/// Request counters for one job run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub requests: u64,
    pub retries: u64,
}

/// Sends requests to one service endpoint and classifies every response
/// into an [`Outcome`]. Dispatch never fails with an error; all failures
/// are outcomes.
pub struct Dispatcher {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    retry: RetryPolicy,
    pacing: Duration,
    no_match_codes: Vec<String>,
    requests: AtomicU64,
    retries: AtomicU64,
}

impl Dispatcher {
    /// Build a dispatcher with one pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(service: &ServiceConfig, dispatch: &DispatchConfig) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(service.timeout_seconds));
        if !service.use_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: service.endpoint.trim().to_string(),
            token: service.token.clone(),
            retry: RetryPolicy::from_config(dispatch),
            pacing: dispatch.pacing(),
            no_match_codes: dispatch.no_match_codes.clone(),
            requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn no_match_codes(&self) -> &[String] {
        &self.no_match_codes
    }

    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            requests: self.requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }

    /// POST a JSON payload to the endpoint.
    pub async fn post_json(&self, payload: &Value) -> Outcome {
        tracing::debug!(endpoint = self.endpoint.as_str(), payload = %payload, "Dispatching POST");
        self.send(|| self.client.post(&self.endpoint).json(payload))
            .await
    }

    /// GET the endpoint with the given query parameters.
    pub async fn get_query(&self, query: &[(String, String)]) -> Outcome {
        tracing::debug!(endpoint = self.endpoint.as_str(), ?query, "Dispatching GET");
        self.send(|| self.client.get(&self.endpoint).query(query))
            .await
    }

    /// Wait out the pacing delay after a dispatched request.
    pub async fn pace(&self) {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }

    async fn send<F>(&self, build: F) -> Outcome
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let mut performed = 0u32;

        let response = loop {
            match build().bearer_auth(&self.token).send().await {
                Ok(response) => break response,
                Err(e) if e.is_connect() && self.retry.allows_retry(performed) => {
                    performed += 1;
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    let delay = self.retry.delay_for_retry(performed);
                    tracing::warn!(
                        endpoint = self.endpoint.as_str(),
                        retry = performed,
                        max_retries = self.retry.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    let outcome = Outcome::unexpected(describe_send_error(&e, performed));
                    tracing::warn!(endpoint = self.endpoint.as_str(), error = %e, "Request failed");
                    return outcome;
                }
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(status = status.as_u16(), error = %e, "Failed to read response body");
                return Outcome::unexpected(format!("failed to read response body: {e}"));
            }
        };

        if status.is_success() {
            return match serde_json::from_str::<Value>(&body) {
                Ok(parsed) => Outcome::success(parsed),
                Err(e) => {
                    tracing::warn!(status = status.as_u16(), error = %e, "Malformed response body");
                    Outcome::unexpected(format!("malformed response body: {e}"))
                }
            };
        }

        tracing::warn!(status = status.as_u16(), body = body.as_str(), "Service returned an error");
        classify_failure(status.as_u16(), body, &self.no_match_codes)
    }
}

fn describe_send_error(e: &reqwest::Error, retries: u32) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed after {retries} retries: {e}")
    } else {
        format!("request failed: {e}")
    }
}
