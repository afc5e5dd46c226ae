//! Client side of the coaching API.
//!
//! All endpoints are JSON over HTTP with base64 for binary payloads. The
//! interview loop consumes the remote exchange through the [`TurnExchange`]
//! trait so it can be driven by mocks in tests.

pub mod client;
pub mod mock;
pub mod types;

pub use client::ApiClient;
pub use mock::{FallbackScript, ScriptedExchange};
pub use types::{DebriefReport, DimensionScore, QuestionDebrief, RewriteSuggestion, VoiceReply};

use crate::error::Result;
use async_trait::async_trait;

/// One turn of the interview: submit the candidate's recorded answer, get the
/// interviewer's next line.
#[async_trait]
pub trait TurnExchange: Send + Sync {
    async fn exchange(&self, session_id: &str, audio_base64: &str) -> Result<VoiceReply>;
}
