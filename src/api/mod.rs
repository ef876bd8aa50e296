//! Review API boundary.
//!
//! Defines the [`ReviewApi`] trait for abstracting the poll source and
//! provides the blocking HTTP implementation used in production.

mod review;

pub use review::HttpReviewApi;

use crate::Result;
use crate::config::HttpConfig;
use serde_json::Value;
use std::time::Duration;

/// Trait for review API backends.
///
/// The trait seam lets the poll loop run against a scripted backend in
/// tests without touching the network.
pub trait ReviewApi {
    /// Fetches the raw poll payload for submissions changed since `since`
    /// (Unix seconds).
    ///
    /// Returns the parsed JSON body as a generic mapping; the payload
    /// schema is validated downstream, not at this layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails, the server answers with a
    /// non-success status, or the body is not JSON.
    fn fetch(&self, since: u64) -> Result<Value>;
}

impl<A: ReviewApi + ?Sized> ReviewApi for std::sync::Arc<A> {
    fn fetch(&self, since: u64) -> Result<Value> {
        self.as_ref().fetch(since)
    }
}

/// Builds a blocking HTTP client with configured timeouts.
#[must_use]
pub(crate) fn build_http_client(config: HttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder()
        .user_agent(format!("revwatch/{}", env!("CARGO_PKG_VERSION")));
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}
