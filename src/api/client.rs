//! HTTP client for the coaching API.

use crate::api::TurnExchange;
use crate::api::types::{
    DebriefReport, DebriefRequest, StartSessionReply, StartSessionRequest, VoiceReply,
    VoiceRequest,
};
use crate::error::{MensetsuError, Result};
use crate::session::CvSummary;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Client for the coaching backend. One instance per command invocation.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the given base URL (no trailing slash needed).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MensetsuError::Api {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a CV (PDF) and get the structured summary.
    ///
    /// `POST /api/cv`, multipart form, field `file`.
    pub async fn upload_cv(&self, path: &Path) -> Result<CvSummary> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cv.pdf".to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| MensetsuError::Api {
                message: format!("Failed to build upload: {e}"),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/api/cv"))
            .multipart(form)
            .send()
            .await
            .map_err(into_api_error)?;

        parse_json(response).await
    }

    /// Start an interview session.
    ///
    /// `POST /api/session/start` → session id.
    pub async fn start_session(&self, request: &StartSessionRequest) -> Result<String> {
        let response = self
            .http
            .post(self.url("/api/session/start"))
            .json(request)
            .send()
            .await
            .map_err(into_api_error)?;

        let reply: StartSessionReply = parse_json(response).await?;
        Ok(reply.session_id)
    }

    /// Submit one recorded answer, get the interviewer's next line.
    ///
    /// `POST /api/voice`.
    pub async fn send_voice(&self, session_id: &str, audio_base64: &str) -> Result<VoiceReply> {
        let request = VoiceRequest {
            session_id: session_id.to_string(),
            audio_base64: audio_base64.to_string(),
        };

        let response = self
            .http
            .post(self.url("/api/voice"))
            .json(&request)
            .send()
            .await
            .map_err(into_api_error)?;

        parse_json(response).await
    }

    /// Fetch the scored debrief report.
    ///
    /// `POST /api/debrief`.
    pub async fn debrief(&self, session_id: &str) -> Result<DebriefReport> {
        let request = DebriefRequest {
            session_id: session_id.to_string(),
        };

        let response = self
            .http
            .post(self.url("/api/debrief"))
            .json(&request)
            .send()
            .await
            .map_err(into_api_error)?;

        parse_json(response).await
    }

    /// Fetch the debrief through the id-addressed variant.
    ///
    /// `GET /api/debrief/{session_id}`.
    pub async fn debrief_by_id(&self, session_id: &str) -> Result<DebriefReport> {
        let response = self
            .http
            .get(self.url(&format!("/api/debrief/{session_id}")))
            .send()
            .await
            .map_err(into_api_error)?;

        parse_json(response).await
    }
}

#[async_trait]
impl TurnExchange for ApiClient {
    async fn exchange(&self, session_id: &str, audio_base64: &str) -> Result<VoiceReply> {
        self.send_voice(session_id, audio_base64).await
    }
}

fn into_api_error(e: reqwest::Error) -> MensetsuError {
    MensetsuError::Api {
        message: e.to_string(),
    }
}

/// Check the status and decode the JSON body.
async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(MensetsuError::ApiStatus {
            status: status.as_u16(),
        });
    }

    response.json().await.map_err(|e| MensetsuError::Api {
        message: format!("Failed to parse response: {e}"),
    })
}
