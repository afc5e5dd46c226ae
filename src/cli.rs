//! Command-line interface for mensetsu
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Voice mock-interview practice in your terminal
#[derive(Parser, Debug)]
#[command(
    name = "mensetsu",
    version,
    about = "Voice mock-interview practice in your terminal"
)]
pub struct Cli {
    /// Subcommand to execute (default: run the interview)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: offline/timer notes, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Coaching API base URL override
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Audio input device (e.g., pipewire)
    #[arg(long, global = true, value_name = "DEVICE")]
    pub device: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare a session: CV, target company, language mode, duration
    Onboard {
        /// Path to your CV (PDF). Without it a sample profile is used
        #[arg(long, value_name = "FILE")]
        cv: Option<PathBuf>,

        /// Target company name
        #[arg(long, value_name = "NAME")]
        company: String,

        /// Interview language mode (japanese or english)
        #[arg(long, value_name = "MODE")]
        language: Option<String>,

        /// Session duration (e.g., 15m, 900s, or bare minutes)
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_minutes)]
        duration: Option<u64>,
    },

    /// Run the voice interview for the onboarded session
    Interview,

    /// Fetch and show the scored debrief for the last session
    Debrief,

    /// List available audio input devices
    Devices,

    /// Inspect or edit configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g., detector.silence_threshold)
    Get {
        /// Dotted key path (e.g., api.base_url, detector.min_speak_ms)
        key: String,
    },
    /// Set a configuration value by key
    Set {
        /// Dotted key path (e.g., api.base_url, detector.min_speak_ms)
        key: String,
        /// Value to set
        value: String,
    },
    /// List current configuration values
    List,
    /// Print the configuration file path
    Path,
}

/// Parse a session duration string into whole minutes.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (minutes), single-unit (`15m`, `900s`), and compound (`1h30m`). Durations
/// round up to the next minute, with a one-minute floor.
pub fn parse_duration_minutes(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → minutes
    if let Ok(minutes) = s.parse::<u64>() {
        return Ok(minutes.max(1));
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs().div_ceil(60).max(1))
        .map_err(|e| e.to_string())
}
