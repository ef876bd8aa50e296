//! Observability.
//!
//! Structured logging only: the watcher emits `tracing` events and a
//! handful of `metrics` facade counters. No exporter is installed here —
//! the counters are no-ops unless the embedding process wires one up.

use crate::{Error, Result};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-oriented output for terminals.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl LogFormat {
    /// Parses a format name; anything unrecognized falls back to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }

    /// Reads the format from `REVWATCH_LOG_FORMAT`.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("REVWATCH_LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Initializes logging for the process.
///
/// The filter comes from `REVWATCH_LOG` (env-filter directives) when set,
/// otherwise defaults to `info` — or `debug` with `verbose`.
///
/// # Errors
///
/// Returns an error if logging has already been initialized.
pub fn init(verbose: bool) -> Result<()> {
    if OBSERVABILITY_INIT.get().is_some() {
        return Err(Error::Config(
            "observability already initialized".to_string(),
        ));
    }

    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("REVWATCH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    match LogFormat::from_env() {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .with(filter)
                .try_init()
                .map_err(init_error)?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .with(filter)
                .try_init()
                .map_err(init_error)?;
        }
    }

    OBSERVABILITY_INIT.set(()).map_err(|()| {
        Error::Config("failed to mark observability initialized".to_string())
    })?;

    Ok(())
}

/// Helper to convert init errors.
#[allow(clippy::needless_pass_by_value)]
fn init_error(e: tracing_subscriber::util::TryInitError) -> Error {
    Error::Config(e.to_string())
}
