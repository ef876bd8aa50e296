//! Poll response validation and message formatting.

use crate::models::{Submission, status};
use crate::{Error, Result};
use serde_json::Value;

/// Inspects a decoded poll response and returns the candidate submission,
/// if any.
///
/// Only the first (most recent) entry of the list is considered: the
/// watcher targets a single user with one active submission slot, so
/// simultaneous changes between polls collapse to the newest one. An
/// accepted limitation, not a defect.
///
/// # Errors
///
/// Returns [`Error::Schema`] if the `submissions` field is missing or not a
/// list, or if the head entry's status is not a known catalog member.
pub fn evaluate(response: &Value) -> Result<Option<Value>> {
    let submissions = response
        .get("submissions")
        .ok_or_else(|| Error::Schema("\"submissions\" field is missing".to_string()))?;
    let entries = submissions
        .as_array()
        .ok_or_else(|| Error::Schema("\"submissions\" is not a list".to_string()))?;

    let Some(head) = entries.first() else {
        return Ok(None);
    };

    match head.get("status").and_then(Value::as_str) {
        Some(code) if status::is_known(code) => Ok(Some(head.clone())),
        Some(code) => Err(Error::Schema(format!("unknown review status {code:?}"))),
        None => Err(Error::Schema(
            "submission status is missing or not a string".to_string(),
        )),
    }
}

/// Formats the user-facing message for a status change.
///
/// # Errors
///
/// Returns [`Error::Format`] if the entry's `name` or `status` is not a
/// string, or the status has no catalog verdict. The message is complete or
/// absent — never partial.
pub fn format_status_message(submission: &Value) -> Result<String> {
    let record = Submission::from_value(submission)?;
    let verdict = status::verdict(&record.status)
        .ok_or_else(|| Error::Format(format!("no verdict for status {:?}", record.status)))?;

    Ok(format!(
        "Changed review status for submission \"{}\". {verdict}",
        record.name
    ))
}
