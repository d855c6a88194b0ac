//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "accel", version, about = "ADXL345 activity streaming pipeline")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/accel_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample, classify and stream until interrupted (Ctrl-C)
    Run {
        /// Use the simulated register bus instead of I2C
        #[arg(long, action = ArgAction::SetTrue)]
        simulate: bool,
        /// Seconds between periodic stats log lines (0 disables)
        #[arg(long, value_name = "SECS", default_value_t = 10)]
        stats_every: u64,
    },
    /// Verify the sensor identity and read one sample
    SelfCheck {
        /// Use the simulated register bus instead of I2C
        #[arg(long, action = ArgAction::SetTrue)]
        simulate: bool,
    },
}
