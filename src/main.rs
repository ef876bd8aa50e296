//! Binary entry point for revwatch.
//!
//! Loads configuration from the environment (honoring a `.env` file),
//! initializes logging, and starts the polling loop.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr/print_stdout in the main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use revwatch::{
    HttpReviewApi, TelegramNotifier, WatchConfig, Watcher, config::DEFAULT_ENDPOINT, observability,
};
use std::process::ExitCode;
use std::time::Duration;

/// Revwatch - forwards homework review verdicts to a Telegram chat.
#[derive(Parser)]
#[command(name = "revwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the polling loop.
    Run {
        /// Perform exactly one poll cycle and exit.
        #[arg(long)]
        once: bool,
    },

    /// Validate configuration and exit without touching the network.
    Check,
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env file is fine; the environment may be set directly.
    dotenvy::dotenv().ok();

    if let Err(e) = observability::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match WatchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Run { once } => cmd_run(&config, once),
        Commands::Check => cmd_check(&config),
    }
}

/// Run command.
fn cmd_run(config: &WatchConfig, once: bool) -> ExitCode {
    let api = HttpReviewApi::from_config(config);
    let notifier = TelegramNotifier::from_config(config);
    let mut watcher =
        Watcher::new(api, notifier).with_interval(Duration::from_secs(config.interval_secs));

    if once {
        let outcome = watcher.run_cycle();
        tracing::info!(?outcome, "Single cycle finished");
        return if outcome.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    watcher.run();

    // The loop only ends with the process.
    ExitCode::SUCCESS
}

/// Check command.
fn cmd_check(config: &WatchConfig) -> ExitCode {
    println!("Configuration OK");
    println!("  Endpoint: {}", config.endpoint);
    if config.endpoint != DEFAULT_ENDPOINT {
        println!("    (overridden via REVWATCH_ENDPOINT)");
    }
    println!("  Chat id: {}", config.chat_id);
    println!("  Poll interval: {}s", config.interval_secs);
    println!(
        "  HTTP timeouts: request {}ms, connect {}ms",
        config.http.timeout_ms, config.http.connect_timeout_ms
    );
    println!("  API_TOKEN: set (redacted)");
    println!("  BOT_TOKEN: set (redacted)");

    ExitCode::SUCCESS
}
