//! Telegram delivery backend.
//!
//! Sends each notification with one `sendMessage` call against the Bot API.
//! The bot token is part of the request URL, so transport errors are
//! stripped of their URL before they are rendered anywhere.

use super::Notifier;
use crate::config::{HttpConfig, WatchConfig};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Default Telegram Bot API base URL.
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Delivers watcher notifications to a single Telegram chat.
pub struct TelegramNotifier {
    /// Telegram bot credential.
    bot_token: SecretString,
    /// Destination chat id.
    chat_id: String,
    /// Bot API base URL.
    api_base: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramNotifier {
    /// Creates a new notifier for the given bot and chat.
    #[must_use]
    pub fn new(bot_token: SecretString, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token,
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client: crate::api::build_http_client(HttpConfig::from_env()),
        }
    }

    /// Creates a notifier from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.bot_token.clone(), config.chat_id.clone()).with_http_config(config.http)
    }

    /// Overrides the Bot API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.client = crate::api::build_http_client(config);
        self
    }

    /// Returns the destination chat id.
    #[must_use]
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl Notifier for TelegramNotifier {
    fn deliver(&self, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.bot_token.expose_secret()
        );
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self.client.post(url).json(&body).send().map_err(|e| {
            // The URL embeds the bot token; drop it before the error
            // message can reach logs or the failure notification.
            let e = e.without_url();
            tracing::error!(error = %e, "Telegram send failed");
            Error::Delivery {
                cause: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            tracing::error!(status = %status, detail = %detail, "Telegram API returned error status");
            return Err(Error::Delivery {
                cause: format!("Telegram API returned HTTP {status}: {detail}"),
            });
        }

        tracing::info!(chat_id = %self.chat_id, "Notification dispatched");
        Ok(())
    }
}
