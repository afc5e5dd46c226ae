//! Default configuration constants for mensetsu.
//!
//! Shared across config types and the interview controller so the tuning
//! values live in one place.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech processing and is what the coaching
/// backend expects for uploaded answers.
pub const SAMPLE_RATE: u32 = 16000;

/// Default silence threshold on the 0–255 amplitude level scale.
///
/// Frame levels below this value count as silence. 12 is tuned for typical
/// microphone input: quiet-room noise sits well below it, speech well above.
pub const SILENCE_THRESHOLD: f32 = 12.0;

/// Default continuous silence duration (ms) before an answer is considered
/// finished and submitted.
///
/// 2200ms allows for natural mid-answer pauses without cutting the candidate
/// off; pausing longer than that submits the answer.
pub const SILENCE_DURATION_MS: u32 = 2200;

/// Minimum speaking time (ms) before silence detection may fire.
///
/// Prevents a premature cut-off from the initial breath or hesitation at the
/// start of an answer.
pub const MIN_SPEAK_MS: u32 = 1500;

/// Full-scale value of the amplitude level used by the silence detector.
pub const LEVEL_SCALE: f32 = 255.0;

/// Polling cadence (ms) of the recording loop.
pub const FRAME_INTERVAL_MS: u64 = 30;

/// Default interview session duration in minutes.
pub const SESSION_DURATION_MINUTES: u64 = 15;

/// Once the locally-tracked remaining time drops to this many seconds, the
/// offline fallback serves the closing line and ends the interview.
pub const CLOSING_WINDOW_SECS: u64 = 30;

/// Floor (ms) of the simulated speaking dwell when a reply carries no audio.
pub const SPEAK_FLOOR_MS: u64 = 1500;

/// Per-character increment (ms) of the simulated speaking dwell.
pub const SPEAK_PER_CHAR_MS: u64 = 45;

/// Delay (ms) after the closing line before moving on to the debrief,
/// so the line can finish playing.
pub const COMPLETE_DELAY_MS: u64 = 3000;

/// Default base URL of the coaching API.
pub const API_BASE_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout in seconds.
pub const API_TIMEOUT_SECS: u64 = 30;

/// Simulated loading delay (ms) before the canned debrief is shown when the
/// API is unreachable.
pub const DEBRIEF_FALLBACK_DELAY_MS: u64 = 1200;

/// Default interview language mode.
pub const DEFAULT_LANGUAGE: &str = "japanese";

/// Placeholder shown for candidate turns. Transcription happens server-side;
/// the client only acknowledges that the answer was captured.
pub const CANDIDATE_ACK: &str = "Answer received";
