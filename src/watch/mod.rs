//! The polling loop.
//!
//! A [`Watcher`] owns the two pieces of cycle-to-cycle state — the time
//! checkpoint and the last reported error — and drives one poll cycle at a
//! time: fetch, validate, format, deliver, advance. Every failure inside a
//! cycle is caught at this boundary, rendered as a single human-readable
//! message, deduplicated against the previous one, and answered with the
//! sleep-and-retry policy. The loop has no terminal state; only process
//! termination stops it.

pub mod response;

pub use response::{evaluate, format_status_message};

use crate::api::ReviewApi;
use crate::config::DEFAULT_INTERVAL_SECS;
use crate::notify::Notifier;
use crate::{Error, Result, current_timestamp};
use serde_json::Value;
use std::time::Duration;

/// Outcome of one poll cycle, after failure handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle completed and no notifiable change was found.
    Quiet,
    /// A status-change notification was delivered; carries the message text.
    Notified(String),
    /// The cycle failed; carries the failure message.
    Failed(String),
}

impl CycleOutcome {
    /// Whether the cycle completed without entering the error branch.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Polls the review API on a fixed interval and forwards status changes.
pub struct Watcher<A: ReviewApi, N: Notifier> {
    /// Poll source.
    api: A,
    /// Notification destination.
    notifier: N,
    /// Pause between cycles.
    interval: Duration,
    /// Lower bound of the next query window (Unix seconds).
    checkpoint: u64,
    /// Text of the most recently delivered failure notification.
    last_error: Option<String>,
}

impl<A: ReviewApi, N: Notifier> Watcher<A, N> {
    /// Creates a watcher with the default interval and a checkpoint seeded
    /// to the current time.
    #[must_use]
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            checkpoint: current_timestamp(),
            last_error: None,
        }
    }

    /// Sets the pause between poll cycles.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Pins the initial checkpoint.
    #[must_use]
    pub fn with_checkpoint(mut self, checkpoint: u64) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    /// Returns the current checkpoint.
    #[must_use]
    pub const fn checkpoint(&self) -> u64 {
        self.checkpoint
    }

    /// Runs the loop forever.
    ///
    /// The sleep between cycles is plain [`std::thread::sleep`]: not
    /// cancellable, not signal-aware. Stopping the process is the only way
    /// out, which is exactly the contract this daemon wants.
    pub fn run(&mut self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            checkpoint = self.checkpoint,
            "Watcher started"
        );
        loop {
            self.run_cycle();
            std::thread::sleep(self.interval);
        }
    }

    /// Runs one poll cycle, applying the failure-notification policy.
    ///
    /// This never returns an error: failures are converted to a
    /// [`CycleOutcome::Failed`] after being reported (or suppressed as a
    /// repeat). Callers that need an exit code (`run --once`) inspect the
    /// outcome.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let span = tracing::debug_span!("watch.cycle", checkpoint = self.checkpoint);
        let _enter = span.enter();

        match self.poll_once() {
            Ok(Some(message)) => {
                metrics::counter!("watch_cycles_total", "outcome" => "notified").increment(1);
                CycleOutcome::Notified(message)
            }
            Ok(None) => {
                metrics::counter!("watch_cycles_total", "outcome" => "quiet").increment(1);
                tracing::debug!("No status change");
                CycleOutcome::Quiet
            }
            Err(err) => {
                metrics::counter!("watch_cycles_total", "outcome" => "error").increment(1);
                CycleOutcome::Failed(self.handle_failure(&err))
            }
        }
    }

    /// One fetch-validate-format-deliver pass.
    ///
    /// Returns the delivered message, or `None` for a quiet cycle. The
    /// checkpoint advances only when the whole pass succeeded — a failed
    /// delivery leaves it untouched so the change is picked up again.
    fn poll_once(&mut self) -> Result<Option<String>> {
        let response = self.api.fetch(self.checkpoint)?;
        let candidate = response::evaluate(&response)?;

        let delivered = match candidate {
            Some(entry) => {
                let message = response::format_status_message(&entry)?;
                self.notifier.deliver(&message)?;
                metrics::counter!("watch_notifications_total", "kind" => "status").increment(1);
                Some(message)
            }
            None => None,
        };

        self.advance_checkpoint(&response);
        Ok(delivered)
    }

    /// Advances the checkpoint from the server-reported `current_date`.
    ///
    /// A missing or non-positive value keeps the previous checkpoint; the
    /// next window is merely wider, which the head-only evaluation
    /// tolerates.
    fn advance_checkpoint(&mut self, response: &Value) {
        match response.get("current_date").and_then(Value::as_u64) {
            Some(ts) if ts > 0 => {
                tracing::debug!(checkpoint = ts, "Checkpoint advanced");
                self.checkpoint = ts;
            }
            _ => {
                tracing::warn!(
                    checkpoint = self.checkpoint,
                    "Response carries no usable \"current_date\"; keeping previous checkpoint"
                );
            }
        }
    }

    /// Reports a failed cycle, deduplicating against the last delivered
    /// failure message.
    ///
    /// Best-effort: the failure notification is never retried within the
    /// cycle. The memo only records messages that were actually delivered,
    /// so a failed announcement is eligible again next cycle.
    fn handle_failure(&mut self, err: &Error) -> String {
        let message = format!("Watcher failure: {err}");
        tracing::error!(error = %err, "Poll cycle failed");

        if self.last_error.as_deref() == Some(message.as_str()) {
            tracing::debug!("Identical failure already reported; suppressing notification");
            return message;
        }

        match self.notifier.deliver(&message) {
            Ok(()) => {
                metrics::counter!("watch_notifications_total", "kind" => "error").increment(1);
                self.last_error = Some(message.clone());
            }
            Err(delivery_err) => {
                tracing::error!(error = %delivery_err, "Could not deliver failure notification");
            }
        }

        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted poll source; pops one queued result per fetch.
    struct ScriptedApi {
        responses: Mutex<VecDeque<Result<Value>>>,
    }

    impl ScriptedApi {
        fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
            }
        }

        fn queue(&self, result: Result<Value>) {
            self.responses.lock().expect("lock").push_back(result);
        }
    }

    impl ReviewApi for ScriptedApi {
        fn fetch(&self, _since: u64) -> Result<Value> {
            self.responses
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Ok(json!({"submissions": []})))
        }
    }

    /// Recording notifier; optionally fails queued deliveries.
    struct RecordingNotifier {
        delivered: Mutex<Vec<String>>,
        failures: Mutex<VecDeque<Error>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                failures: Mutex::new(VecDeque::new()),
            }
        }

        fn queue_failure(&self, err: Error) {
            self.failures.lock().expect("lock").push_back(err);
        }

        fn delivered(&self) -> Vec<String> {
            self.delivered.lock().expect("lock").clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn deliver(&self, text: &str) -> Result<()> {
            if let Some(err) = self.failures.lock().expect("lock").pop_front() {
                return Err(err);
            }
            self.delivered.lock().expect("lock").push(text.to_string());
            Ok(())
        }
    }

    fn watcher(
        api: Arc<ScriptedApi>,
        notifier: Arc<RecordingNotifier>,
    ) -> Watcher<Arc<ScriptedApi>, Arc<RecordingNotifier>> {
        Watcher::new(api, notifier).with_checkpoint(1_000)
    }

    fn transport_error() -> Error {
        Error::Transport {
            operation: "review_fetch".to_string(),
            cause: "connect error: connection refused".to_string(),
        }
    }

    #[test]
    fn test_status_change_notifies_and_advances_checkpoint() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Ok(json!({
            "submissions": [{"name": "HW1", "status": "approved"}],
            "current_date": 1_700_000_000,
        })));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        let outcome = watcher.run_cycle();

        assert!(matches!(outcome, CycleOutcome::Notified(_)));
        assert_eq!(watcher.checkpoint(), 1_700_000_000);
        assert_eq!(notifier.delivered().len(), 1);
        assert!(notifier.delivered()[0].contains("HW1"));
    }

    #[test]
    fn test_quiet_cycle_advances_checkpoint() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Ok(json!({"submissions": [], "current_date": 2_000})));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        let outcome = watcher.run_cycle();

        assert_eq!(outcome, CycleOutcome::Quiet);
        assert_eq!(watcher.checkpoint(), 2_000);
        assert!(notifier.delivered().is_empty());
    }

    #[test]
    fn test_missing_current_date_keeps_checkpoint() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Ok(json!({"submissions": []})));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        let outcome = watcher.run_cycle();

        assert_eq!(outcome, CycleOutcome::Quiet);
        assert_eq!(watcher.checkpoint(), 1_000);
    }

    #[test]
    fn test_zero_current_date_keeps_checkpoint() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Ok(json!({"submissions": [], "current_date": 0})));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        watcher.run_cycle();

        assert_eq!(watcher.checkpoint(), 1_000);
    }

    #[test]
    fn test_repeated_identical_error_notifies_once() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Err(transport_error()));
        api.queue(Err(transport_error()));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        watcher.run_cycle();
        watcher.run_cycle();

        assert_eq!(notifier.delivered().len(), 1);
        assert!(notifier.delivered()[0].contains("Watcher failure"));
    }

    #[test]
    fn test_distinct_errors_notify_each() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Err(transport_error()));
        api.queue(Err(Error::Http { status: 502 }));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        watcher.run_cycle();
        watcher.run_cycle();

        assert_eq!(notifier.delivered().len(), 2);
    }

    #[test]
    fn test_error_memo_survives_success() {
        // Strict dedup variant: error, then a clean cycle, then the same
        // error again — still suppressed.
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Err(transport_error()));
        api.queue(Ok(json!({"submissions": [], "current_date": 3_000})));
        api.queue(Err(transport_error()));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        watcher.run_cycle();
        watcher.run_cycle();
        watcher.run_cycle();

        assert_eq!(notifier.delivered().len(), 1);
    }

    #[test]
    fn test_failed_status_delivery_keeps_checkpoint() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Ok(json!({
            "submissions": [{"name": "HW1", "status": "approved"}],
            "current_date": 1_700_000_000,
        })));
        notifier.queue_failure(Error::Delivery {
            cause: "chat not found".to_string(),
        });

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        let outcome = watcher.run_cycle();

        assert!(!outcome.is_success());
        assert_eq!(watcher.checkpoint(), 1_000);
        // The error branch then announced the delivery failure itself.
        assert_eq!(notifier.delivered().len(), 1);
        assert!(notifier.delivered()[0].contains("delivery failed"));
    }

    #[test]
    fn test_failed_error_delivery_leaves_memo_unset() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Err(transport_error()));
        api.queue(Err(transport_error()));
        // First failure announcement cannot be delivered either.
        notifier.queue_failure(Error::Delivery {
            cause: "chat not found".to_string(),
        });

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        watcher.run_cycle();
        watcher.run_cycle();

        // The second cycle retries the announcement and succeeds.
        assert_eq!(notifier.delivered().len(), 1);
    }

    #[test]
    fn test_schema_error_keeps_checkpoint() {
        let api = Arc::new(ScriptedApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        api.queue(Ok(json!({"wrong": true, "current_date": 9_000})));

        let mut watcher = watcher(Arc::clone(&api), Arc::clone(&notifier));
        let outcome = watcher.run_cycle();

        assert!(!outcome.is_success());
        assert_eq!(watcher.checkpoint(), 1_000);
    }
}
