//! Blocking HTTP client for the homework-review API.

use super::{ReviewApi, build_http_client};
use crate::config::{DEFAULT_ENDPOINT, HttpConfig, WatchConfig};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

/// Review API client issuing one authenticated GET per poll cycle.
pub struct HttpReviewApi {
    /// API endpoint.
    endpoint: String,
    /// Review API credential.
    token: SecretString,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl HttpReviewApi {
    /// Creates a new client against the default endpoint.
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token,
            client: build_http_client(HttpConfig::from_env()),
        }
    }

    /// Creates a client from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.api_token.clone())
            .with_endpoint(&config.endpoint)
            .with_http_config(config.http)
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ReviewApi for HttpReviewApi {
    fn fetch(&self, since: u64) -> Result<Value> {
        tracing::debug!(since, endpoint = %self.endpoint, "Requesting review updates");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("from_date", since.to_string())])
            .header(
                "Authorization",
                format!("OAuth {}", self.token.expose_secret()),
            )
            .send()
            .map_err(|e| {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else if e.is_request() {
                    "request"
                } else {
                    "unknown"
                };
                tracing::error!(
                    error = %e,
                    error_kind = error_kind,
                    "Review API request failed"
                );
                Error::Transport {
                    operation: "review_fetch".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Review API returned error status");
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .map_err(|e| Error::Schema(format!("response body is not valid JSON: {e}")))
    }
}
