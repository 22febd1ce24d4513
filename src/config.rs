//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{
    format::{preset_seconds, ClockTime},
    render::OutputFormat,
    state::ControllerConfig,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "countdown")]
#[command(about = "A countdown timer with start, pause and stop controls")]
#[command(version)]
pub struct Config {
    /// Initial duration as SS, MM:SS or HH:MM:SS; starts immediately when non-zero
    pub duration: Option<ClockTime>,

    /// Use a quick-select preset instead (1 = 00:30 ... 10 = 05:00)
    #[arg(short, long, conflicts_with = "duration", value_parser = clap::value_parser!(u8).range(1..=10))]
    pub preset: Option<u8>,

    /// Milliseconds between ticks
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Milliseconds to wait at zero before stopping
    #[arg(long, default_value = "300")]
    pub grace_ms: u64,

    /// Write snapshots as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Keep reading commands after the countdown returns to stopped
    #[arg(long)]
    pub keep_open: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Duration to configure before reading commands, in seconds
    pub fn initial_duration(&self) -> u64 {
        if let Some(preset) = self.preset {
            return preset_seconds(usize::from(preset)).unwrap_or(0);
        }
        self.duration.map(|clock| clock.total_seconds()).unwrap_or(0)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Controller timing derived from the CLI flags
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            tick: self.tick(),
            grace: self.grace(),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
