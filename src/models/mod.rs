//! Data models for revwatch.

pub mod status;

use crate::{Error, Result};
use serde_json::Value;

/// One homework review record returned by the API.
///
/// The wire payload may carry additional fields; only the display name and
/// the status code matter for notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Display name of the submission.
    pub name: String,
    /// Review status code (a [`status`] catalog key).
    pub status: String,
}

impl Submission {
    /// Extracts a typed submission from a raw API entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if `name` or `status` is missing or not a
    /// string. Null fields have been observed upstream; they must fail here
    /// rather than produce a partial message.
    pub fn from_value(value: &Value) -> Result<Self> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Format("submission name is missing or not a string".to_string()))?;
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Format("submission status is missing or not a string".to_string())
            })?;

        Ok(Self {
            name: name.to_string(),
            status: status.to_string(),
        })
    }
}
