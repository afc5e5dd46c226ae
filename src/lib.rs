//! mensetsu - Voice mock-interview practice in your terminal
//!
//! Records your answers, detects when you've finished speaking, exchanges
//! each turn with the coaching backend, and plays the interviewer's replies.
//! When the backend is offline, a scripted interviewer takes over.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod api;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod interview;
pub mod output;
pub mod session;

// Composition root - needs everything
#[cfg(all(feature = "cpal-audio", feature = "cli"))]
pub mod app;

// Core traits (capture → detect → exchange → playback)
pub use api::TurnExchange;
pub use audio::playback::SpeechPlayer;
pub use audio::recorder::AudioSource;
pub use interview::controller::EventSink;

// Interview loop
pub use interview::controller::{ControllerConfig, InterviewOutcome, TurnController};
pub use interview::detector::SilenceDetector;
pub use interview::status::Status;

// Error handling
pub use error::{MensetsuError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
