//! Notification delivery boundary.
//!
//! Defines the [`Notifier`] trait for abstracting message delivery and
//! provides the Telegram implementation used in production. Delivery
//! failures surface as errors so the poll loop can account for them —
//! a failed send is never treated as a sent notification.

mod telegram;

pub use telegram::TelegramNotifier;

use crate::Result;

/// Trait for notification delivery backends.
pub trait Notifier {
    /// Delivers `text` to the configured destination.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Delivery`] if the send fails for any reason.
    fn deliver(&self, text: &str) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn deliver(&self, text: &str) -> Result<()> {
        self.as_ref().deliver(text)
    }
}
