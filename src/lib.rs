//! # Revwatch
//!
//! A single-user watcher for homework review statuses.
//!
//! Revwatch polls a review API on a fixed interval, detects submission
//! status changes, and forwards a human-readable verdict to one Telegram
//! chat. Transient failures are announced once per distinct error and the
//! loop always recovers by sleeping and retrying.
//!
//! ## Example
//!
//! ```rust,ignore
//! use revwatch::{HttpReviewApi, TelegramNotifier, WatchConfig, Watcher};
//!
//! let config = WatchConfig::from_env()?;
//! let api = HttpReviewApi::from_config(&config);
//! let notifier = TelegramNotifier::from_config(&config);
//! let mut watcher = Watcher::new(api, notifier);
//! watcher.run();
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod api;
pub mod config;
pub mod models;
pub mod notify;
pub mod observability;
pub mod watch;

// Re-exports for convenience
pub use api::{HttpReviewApi, ReviewApi};
pub use config::{HttpConfig, WatchConfig};
pub use models::Submission;
pub use notify::{Notifier, TelegramNotifier};
pub use watch::{CycleOutcome, Watcher};

/// Error type for revwatch operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When | Treatment |
/// |---------|-------------|-----------|
/// | `Config` | Required environment variables missing, unparsable overrides | fatal at startup |
/// | `Transport` | Network unreachable, connect failure, request timeout | retried next cycle |
/// | `Http` | Review API returns a non-success status | retried next cycle |
/// | `Schema` | Response body is not JSON, `submissions` missing/malformed, unknown status code | response discarded, retried next cycle |
/// | `Format` | Submission fields are not strings, status has no verdict | retried next cycle |
/// | `Delivery` | Telegram send fails or returns a non-success status | notification dropped for the cycle |
///
/// Only `Config` may terminate the process; every other variant is caught at
/// the watcher boundary and answered with the sleep-and-retry policy.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Required configuration is missing or invalid.
    ///
    /// Raised once, at startup; the message names every missing variable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The network transport failed before an HTTP status was received.
    ///
    /// Raised when:
    /// - The connection cannot be established
    /// - The request or connect timeout elapses
    /// - The request fails mid-flight
    #[error("transport failure during {operation}: {cause}")]
    Transport {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The review API answered with a non-success HTTP status.
    #[error("review API returned HTTP {status}")]
    Http {
        /// The HTTP status code.
        status: u16,
    },

    /// The response payload does not have the expected shape.
    ///
    /// Raised when:
    /// - The body is not valid JSON
    /// - The `submissions` field is missing or not a list
    /// - The head submission carries an unknown status code
    #[error("malformed API response: {0}")]
    Schema(String),

    /// A submission record could not be rendered as a message.
    ///
    /// Raised when `name` or `status` is not a string, or the status has no
    /// catalog verdict. A defensive check against malformed upstream data
    /// that slipped past validation.
    #[error("could not format notification: {0}")]
    Format(String),

    /// The notification could not be delivered to the chat.
    #[error("notification delivery failed: {cause}")]
    Delivery {
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for revwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Used to seed the poll checkpoint at startup. Falls back to 0 if the
/// system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use revwatch::current_timestamp;
///
/// let ts = current_timestamp();
/// assert!(ts > 0); // Should be a reasonable Unix timestamp
/// ```
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("missing required environment variables: CHAT_ID".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: missing required environment variables: CHAT_ID"
        );

        let err = Error::Transport {
            operation: "review_fetch".to_string(),
            cause: "timeout error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "transport failure during review_fetch: timeout error"
        );

        let err = Error::Http { status: 502 };
        assert_eq!(err.to_string(), "review API returned HTTP 502");

        let err = Error::Delivery {
            cause: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "notification delivery failed: connection refused"
        );
    }

    #[test]
    fn test_error_messages_are_distinct() {
        // The watcher dedups on rendered text; variants must not collide.
        let schema = Error::Schema("\"submissions\" field is missing".to_string()).to_string();
        let format = Error::Format("submission name is missing".to_string()).to_string();
        assert_ne!(schema, format);
    }
}
