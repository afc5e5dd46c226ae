//! Request and response shapes of the coaching API.

use crate::session::{CvSummary, LanguageMode};
use serde::{Deserialize, Serialize};

/// `POST /api/session/start` request body.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub company: String,
    pub cv_data: CvSummary,
    pub language_mode: LanguageMode,
    pub session_duration_minutes: u64,
}

/// `POST /api/session/start` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionReply {
    pub session_id: String,
}

/// `POST /api/voice` request body.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceRequest {
    pub session_id: String,
    pub audio_base64: String,
}

/// `POST /api/voice` response body: the interviewer's next line.
///
/// `time_remaining_seconds` and `question_number`, when present, are
/// authoritative and override any client-side tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceReply {
    pub response_text: String,
    #[serde(default)]
    pub response_jp: Option<String>,
    #[serde(default)]
    pub audio_base64: Option<String>,
    pub interview_complete: bool,
    #[serde(default)]
    pub time_remaining_seconds: Option<u64>,
    #[serde(default)]
    pub question_number: Option<u32>,
}

/// `POST /api/debrief` request body.
#[derive(Debug, Clone, Serialize)]
pub struct DebriefRequest {
    pub session_id: String,
}

/// Structured scoring report from `POST /api/debrief`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebriefReport {
    pub overall_score: f32,
    pub scores: Vec<DimensionScore>,
    pub questions: Vec<QuestionDebrief>,
    pub rewrites: Vec<RewriteSuggestion>,
    pub company_notes: String,
}

/// One scored evaluation dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: String,
    pub dimension_en: String,
    pub score: f32,
}

/// Per-question evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDebrief {
    pub question: String,
    pub answer_summary: String,
    pub hr_monologue: String,
    #[serde(default)]
    pub score_penalty: Option<String>,
}

/// Suggested phrasing rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteSuggestion {
    pub original: String,
    pub replacement: String,
    pub reason: String,
}
