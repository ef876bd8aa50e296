//! Review status catalog.
//!
//! The review API reports each submission with one of a small, fixed set of
//! status codes. Anything outside this catalog is a data-integrity error,
//! not a silent skip.

/// Known status codes and their human-readable verdict text.
pub const STATUS_VERDICTS: &[(&str, &str)] = &[
    (
        "approved",
        "Review complete: the reviewer liked everything. Hooray!",
    ),
    ("reviewing", "The submission was picked up for review."),
    ("rejected", "Review complete: the reviewer found mistakes."),
];

/// Returns the verdict text for a status code, if the code is known.
#[must_use]
pub fn verdict(status: &str) -> Option<&'static str> {
    STATUS_VERDICTS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, text)| *text)
}

/// Whether a status code is a member of the catalog.
#[must_use]
pub fn is_known(status: &str) -> bool {
    verdict(status).is_some()
}
