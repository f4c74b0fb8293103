//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::state::CompletionPolicy;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "timer-board")]
#[command(about = "Category-grouped countdown timers with a persisted completion history")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, env = "TIMER_BOARD_PORT", default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "TIMER_BOARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted timer and history blobs
    #[arg(short, long, env = "TIMER_BOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Length of one logical second in milliseconds
    #[arg(long, env = "TIMER_BOARD_TICK_MS", default_value = "1000",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Record every timer that completes on a tick, not only the first
    #[arg(long, env = "TIMER_BOARD_RECORD_ALL")]
    pub record_all_completions: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Data directory, falling back to the platform data dir
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("timer-board")
        })
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn completion_policy(&self) -> CompletionPolicy {
        if self.record_all_completions {
            CompletionPolicy::EveryTimer
        } else {
            CompletionPolicy::FirstOnly
        }
    }
}
