//! Offline substitutes for the coaching API.
//!
//! When the backend is unreachable, the interview keeps going on a
//! pre-scripted exchange list and the debrief falls back to a canned report.
//! This is a demo affordance, not a resilience mechanism: no retries, the
//! switch is immediate and silent.

use crate::api::TurnExchange;
use crate::api::types::{
    DebriefReport, DimensionScore, QuestionDebrief, RewriteSuggestion, VoiceReply,
};
use crate::error::{MensetsuError, Result};
use crate::session::CvSummary;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted interviewer line, bilingual.
pub struct ScriptedLine {
    pub en: &'static str,
    pub jp: &'static str,
}

/// The scripted interview. The last entry is the closing line.
pub const SCRIPTED_EXCHANGES: &[ScriptedLine] = &[
    ScriptedLine {
        en: "Please introduce yourself.",
        jp: "自己紹介をお願いします。",
    },
    ScriptedLine {
        en: "Why did you choose this company specifically?",
        jp: "なぜ弊社を志望されたのですか？",
    },
    ScriptedLine {
        en: "What are your strengths and how will you contribute to the team?",
        jp: "あなたの強みは何ですか？チームにどのように貢献できますか？",
    },
    ScriptedLine {
        en: "Tell me about a time you worked closely with a team to solve a problem.",
        jp: "チームで問題を解決した経験について教えてください。",
    },
    ScriptedLine {
        en: "How do you handle situations where you disagree with a group decision?",
        jp: "グループの決定に同意できない場合、どう対応しますか？",
    },
    ScriptedLine {
        en: "What does continuous improvement mean to you?",
        jp: "あなたにとって「改善」とは何ですか？",
    },
    ScriptedLine {
        en: "Why do you want to work in Japan specifically?",
        jp: "なぜ日本で働きたいのですか？",
    },
    ScriptedLine {
        en: "How long do you plan to stay with this company?",
        jp: "弊社にどのくらい在籍する予定ですか？",
    },
    ScriptedLine {
        en: "What would your previous colleagues say about you?",
        jp: "以前の同僚はあなたのことをどう言うと思いますか？",
    },
    ScriptedLine {
        en: "What would you do if your manager asked you to do something you thought was wrong?",
        jp: "上司から間違っていると思うことを頼まれたらどうしますか？",
    },
    ScriptedLine {
        en: "Thank you for your time. We will be in touch.",
        jp: "本日はお時間をいただきありがとうございました。後日ご連絡いたします。",
    },
];

fn line_to_reply(line: &ScriptedLine, complete: bool) -> VoiceReply {
    VoiceReply {
        response_text: line.en.to_string(),
        response_jp: Some(line.jp.to_string()),
        audio_base64: None,
        interview_complete: complete,
        time_remaining_seconds: None,
        question_number: None,
    }
}

/// Deterministic local substitute for the remote turn exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackScript;

impl FallbackScript {
    pub fn new() -> Self {
        Self
    }

    /// The opening question. Served locally on every interview; the backend
    /// never supplies the first line.
    pub fn opening(&self) -> VoiceReply {
        line_to_reply(&SCRIPTED_EXCHANGES[0], false)
    }

    /// The line following the candidate's `question_count`-th answer.
    ///
    /// When `time_up` is set the closing line is served instead and the
    /// interview is marked complete.
    pub fn next_reply(&self, question_count: u32, time_up: bool) -> VoiceReply {
        if time_up {
            let closing = &SCRIPTED_EXCHANGES[SCRIPTED_EXCHANGES.len() - 1];
            return line_to_reply(closing, true);
        }

        let index = (question_count as usize).min(SCRIPTED_EXCHANGES.len() - 2);
        line_to_reply(&SCRIPTED_EXCHANGES[index], false)
    }
}

/// Canned CV summary used when `POST /api/cv` is unavailable (or no CV was
/// supplied).
pub fn sample_cv_summary() -> CvSummary {
    CvSummary {
        name: "Taylor Reed".to_string(),
        background: "Five years of backend engineering across payments and logistics platforms."
            .to_string(),
        target_role: "Software Engineer".to_string(),
    }
}

/// Deterministic local session id used when `POST /api/session/start` is
/// unavailable.
pub fn offline_session_id(company: &str) -> String {
    format!("offline-{}", company.trim().to_lowercase().replace(' ', "-"))
}

/// Canned debrief report used when `POST /api/debrief` is unavailable.
pub fn sample_debrief() -> DebriefReport {
    DebriefReport {
        overall_score: 3.2,
        scores: vec![
            DimensionScore {
                dimension: "自己PR".to_string(),
                dimension_en: "Self-PR".to_string(),
                score: 3.5,
            },
            DimensionScore {
                dimension: "志望動機".to_string(),
                dimension_en: "Motivation".to_string(),
                score: 2.8,
            },
            DimensionScore {
                dimension: "協調性".to_string(),
                dimension_en: "Teamwork".to_string(),
                score: 3.6,
            },
            DimensionScore {
                dimension: "成長意欲".to_string(),
                dimension_en: "Growth mindset".to_string(),
                score: 3.4,
            },
            DimensionScore {
                dimension: "文化適合".to_string(),
                dimension_en: "Culture fit".to_string(),
                score: 2.9,
            },
        ],
        questions: vec![
            QuestionDebrief {
                question: "Please introduce yourself.".to_string(),
                answer_summary: "Concise background summary with a clear link to the target role."
                    .to_string(),
                hr_monologue: "Good structure, though the opening felt rehearsed. I wanted one \
                               concrete detail that only this candidate could say."
                    .to_string(),
                score_penalty: None,
            },
            QuestionDebrief {
                question: "Why did you choose this company specifically?".to_string(),
                answer_summary: "Mentioned the company's products but stayed generic.".to_string(),
                hr_monologue: "This answer could have been given at any of our competitors. \
                               Nothing about why us."
                    .to_string(),
                score_penalty: Some("-0.4 generic motivation".to_string()),
            },
            QuestionDebrief {
                question: "Tell me about a time you worked closely with a team to solve a problem."
                    .to_string(),
                answer_summary: "Described a production incident resolved with two teammates."
                    .to_string(),
                hr_monologue: "Strongest answer of the session. Specific, honest about their own \
                               mistake, clear on the fix."
                    .to_string(),
                score_penalty: None,
            },
        ],
        rewrites: vec![
            RewriteSuggestion {
                original: "I guess I'm pretty good at debugging.".to_string(),
                replacement: "Debugging is one of my core strengths — I traced our worst \
                              production outage to a connection-pool leak in under an hour."
                    .to_string(),
                reason: "Hedging language undercuts a strength; replace it with evidence."
                    .to_string(),
            },
            RewriteSuggestion {
                original: "I want to work here because it's a famous company.".to_string(),
                replacement: "Your team's approach to incremental rollout matches how I like to \
                              ship — I want to learn how you do it at this scale."
                    .to_string(),
                reason: "Prestige is not a motivation an interviewer can engage with.".to_string(),
            },
        ],
        company_notes: "Interviewers here weigh long-term commitment and team harmony over \
                        individual brilliance. Prepare one story about adapting to a group \
                        decision you initially disagreed with."
            .to_string(),
    }
}

/// Scripted turn exchange for tests: pops a queued result per call and
/// records every submission.
pub struct ScriptedExchange {
    replies: Mutex<VecDeque<Result<VoiceReply>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedExchange {
    pub fn new(replies: Vec<Result<VoiceReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// An exchange whose every call fails with a transport error.
    pub fn unreachable() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Submissions seen so far, as `(session_id, audio_base64)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TurnExchange for ScriptedExchange {
    async fn exchange(&self, session_id: &str, audio_base64: &str) -> Result<VoiceReply> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((session_id.to_string(), audio_base64.to_string()));
        }

        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| {
                Err(MensetsuError::Api {
                    message: "connection refused".to_string(),
                })
            })
    }
}
