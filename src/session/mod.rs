//! Interview session types and persisted session state.

pub mod store;

pub use store::{SessionStore, StoredSession};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Interviewer,
    Candidate,
}

/// One exchange unit of the interview transcript.
///
/// Interviewer turns come from the remote exchange (or the offline script);
/// candidate turns carry a placeholder acknowledgement since transcription is
/// server-side. Turns are immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub translation: Option<String>,
}

impl Turn {
    pub fn interviewer(text: impl Into<String>, translation: Option<String>) -> Self {
        Self {
            role: Role::Interviewer,
            text: text.into(),
            translation,
        }
    }

    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            role: Role::Candidate,
            text: text.into(),
            translation: None,
        }
    }
}

/// Interview language mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    Japanese,
    English,
}

impl LanguageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Japanese => "japanese",
            Self::English => "english",
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "japanese" | "ja" | "jp" => Ok(Self::Japanese),
            "english" | "en" => Ok(Self::English),
            other => Err(format!(
                "unknown language mode '{other}' (expected 'japanese' or 'english')"
            )),
        }
    }
}

/// Structured CV summary returned by the coaching API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CvSummary {
    pub name: String,
    pub background: String,
    pub target_role: String,
}
