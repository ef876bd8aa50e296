//! Configuration management.
//!
//! Revwatch is configured entirely through the environment (a `.env` file is
//! honored at startup). The three credentials are required and checked once,
//! before the first poll; everything else has a default with a
//! `REVWATCH_`-prefixed override.

use crate::{Error, Result};
use secrecy::SecretString;

/// Default review API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default pause between poll cycles, in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// HTTP boundary configuration.
///
/// Applies to both the review API client and the Telegram notifier so a
/// hung peer can never stall a cycle beyond a bounded duration.
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl HttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("REVWATCH_HTTP_TIMEOUT_MS") {
            if let Ok(timeout_ms) = v.parse::<u64>() {
                self.timeout_ms = timeout_ms;
            }
        }
        if let Ok(v) = std::env::var("REVWATCH_HTTP_CONNECT_TIMEOUT_MS") {
            if let Ok(connect_timeout_ms) = v.parse::<u64>() {
                self.connect_timeout_ms = connect_timeout_ms;
            }
        }
        self
    }
}

/// Main configuration for revwatch.
///
/// Credentials are held as [`SecretString`] so accidental `Debug` or log
/// output never contains them.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Review API endpoint.
    pub endpoint: String,
    /// Pause between poll cycles, in seconds.
    pub interval_secs: u64,
    /// Review API credential (`Authorization: OAuth <token>`).
    pub api_token: SecretString,
    /// Telegram bot credential.
    pub bot_token: SecretString,
    /// Destination chat id.
    pub chat_id: String,
    /// HTTP boundary timeouts.
    pub http: HttpConfig,
}

impl WatchConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming every missing required variable, or
    /// describing an unparsable override. This is the fail-fast gate: the
    /// watcher never starts polling with incomplete credentials.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_token = non_empty("API_TOKEN");
        let bot_token = non_empty("BOT_TOKEN");
        let chat_id = non_empty("CHAT_ID");

        let (Some(api_token), Some(bot_token), Some(chat_id)) = (api_token, bot_token, chat_id)
        else {
            let mut missing = Vec::new();
            if non_empty("API_TOKEN").is_none() {
                missing.push("API_TOKEN");
            }
            if non_empty("BOT_TOKEN").is_none() {
                missing.push("BOT_TOKEN");
            }
            if non_empty("CHAT_ID").is_none() {
                missing.push("CHAT_ID");
            }
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let interval_secs = match lookup("REVWATCH_INTERVAL_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "REVWATCH_INTERVAL_SECS is not a valid number of seconds: {raw:?}"
                ))
            })?,
            None => DEFAULT_INTERVAL_SECS,
        };

        let endpoint =
            lookup("REVWATCH_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            endpoint,
            interval_secs,
            api_token: SecretString::from(api_token),
            bot_token: SecretString::from(bot_token),
            chat_id,
            http: HttpConfig::from_env(),
        })
    }
}
