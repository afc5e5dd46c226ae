//! Application entry points: wire config, audio, API client and terminal
//! rendering into the interview flow.

use crate::api::mock::{offline_session_id, sample_cv_summary, sample_debrief};
use crate::api::types::StartSessionRequest;
use crate::api::ApiClient;
use crate::audio::capture::{suppress_audio_warnings, CpalAudioSource};
use crate::audio::playback::CpalSpeechPlayer;
use crate::config::Config;
use crate::defaults;
use crate::error::{MensetsuError, Result};
use crate::interview::controller::{ControlCommand, ControllerConfig, TurnController};
use crate::output::{render_debrief, render_turn, TerminalSink};
use crate::session::{LanguageMode, SessionStore, StoredSession};
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

fn api_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )
}

/// Onboard a new session: CV summary, target company, language mode,
/// duration. Everything degrades to canned substitutes when the API is
/// unreachable, so the flow always completes.
pub async fn run_onboard(
    config: &Config,
    cv: Option<&Path>,
    company: &str,
    language: Option<&str>,
    duration_minutes: Option<u64>,
    quiet: bool,
) -> Result<()> {
    let language: LanguageMode = language
        .unwrap_or(&config.session.language)
        .parse()
        .map_err(|message| MensetsuError::ConfigInvalidValue {
            key: "session.language".to_string(),
            message,
        })?;
    let duration_minutes = duration_minutes.unwrap_or(config.session.duration_minutes);

    let client = api_client(config)?;

    let cv_data = match cv {
        Some(path) => match client.upload_cv(path).await {
            Ok(summary) => summary,
            Err(e) => {
                if !quiet {
                    eprintln!("CV upload unavailable ({e}); using a sample profile.");
                }
                sample_cv_summary()
            }
        },
        None => {
            if !quiet {
                eprintln!("No CV supplied; using a sample profile.");
            }
            sample_cv_summary()
        }
    };

    let request = StartSessionRequest {
        company: company.to_string(),
        cv_data: cv_data.clone(),
        language_mode: language,
        session_duration_minutes: duration_minutes,
    };

    let session_id = match client.start_session(&request).await {
        Ok(id) => id,
        Err(e) => {
            if !quiet {
                eprintln!("Session start unavailable ({e}); continuing offline.");
            }
            offline_session_id(company)
        }
    };

    let store = SessionStore::new(SessionStore::default_path());
    store.save(&StoredSession {
        session_id: Some(session_id.clone()),
        company: Some(company.to_string()),
        language_mode: Some(language.to_string()),
        session_duration_minutes: Some(duration_minutes.to_string()),
        cv_data: Some(serde_json::to_string(&cv_data)?),
    })?;

    if !quiet {
        eprintln!();
        eprintln!("Session ready.");
        eprintln!("  Candidate: {} ({})", cv_data.name, cv_data.target_role);
        eprintln!("  Company:   {company}");
        eprintln!("  Language:  {language}");
        eprintln!("  Duration:  {duration_minutes} minutes");
        eprintln!();
        eprintln!("Run `mensetsu interview` when you're ready.");
    }

    Ok(())
}

/// Run the voice interview for the stored session, then show the debrief.
pub async fn run_interview(config: &Config, quiet: bool, verbose: u8) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    let store = SessionStore::new(SessionStore::default_path());
    let stored = store.load()?;
    if !stored.is_onboarded() {
        return Err(MensetsuError::Session {
            message: "no stored session — run `mensetsu onboard --company <name>` first"
                .to_string(),
        });
    }
    let session_id = stored.session_id.clone().unwrap_or_default();
    let company = stored.company.clone().unwrap_or_default();
    let duration_minutes = stored
        .session_duration_minutes
        .as_deref()
        .and_then(|m| m.parse::<u64>().ok())
        .unwrap_or(config.session.duration_minutes);

    let source = CpalAudioSource::new(config.audio.device.as_deref())?;
    let exchange = std::sync::Arc::new(api_client(config)?);
    let player = CpalSpeechPlayer::new();
    let sink = TerminalSink::new(quiet, verbose);

    let controller_config = ControllerConfig {
        detector: config.detector.clone(),
        session_duration: Duration::from_secs(duration_minutes * 60),
        ..ControllerConfig::default()
    };

    // Stdin drives the interview: Enter submits the current answer early,
    // "end" finishes the interview
    let (tx, mut rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = if line.trim().eq_ignore_ascii_case("end")
                || line.trim().eq_ignore_ascii_case("quit")
            {
                ControlCommand::EndInterview
            } else {
                ControlCommand::StopRecording
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });

    if !quiet {
        eprintln!();
        if verbose >= 2 {
            eprintln!("mensetsu {}", crate::version_string());
        }
        eprintln!("Mock interview — {company} ({duration_minutes} minutes)");
        eprintln!(
            "Press Enter to begin. While recording: pause to submit, Enter to submit early, 'end' to finish."
        );
    }

    // The very first turn requires an explicit start
    match rx.recv().await {
        Some(ControlCommand::EndInterview) | None => return Ok(()),
        Some(ControlCommand::StopRecording) => {}
    }

    let mut controller = TurnController::new(
        session_id.clone(),
        controller_config,
        Box::new(source),
        exchange,
        Box::new(player),
        Box::new(sink),
    )
    .with_commands(rx)
    .with_sample_rate(config.audio.sample_rate);

    let outcome = controller.run().await?;

    if !quiet && verbose >= 1 {
        eprintln!();
        eprintln!(
            "Transcript — {} turns, {} questions{}",
            outcome.transcript.len(),
            outcome.questions_asked,
            if outcome.ended_early {
                " (ended early)"
            } else {
                ""
            }
        );
        eprintln!();
        for turn in &outcome.transcript {
            render_turn(turn);
        }
    }

    // Completion (or an early end) leads into the debrief view
    run_debrief(config, quiet).await
}

/// Fetch and render the debrief for the stored session.
pub async fn run_debrief(config: &Config, quiet: bool) -> Result<()> {
    let store = SessionStore::new(SessionStore::default_path());
    let stored = store.load()?;
    let Some(session_id) = stored.session_id.clone() else {
        return Err(MensetsuError::Session {
            message: "no stored session — run `mensetsu onboard --company <name>` first"
                .to_string(),
        });
    };
    let company = stored.company.clone().unwrap_or_else(|| "—".to_string());

    let client = api_client(config)?;
    // The backend exposes both debrief routes; try the id-addressed variant
    // before settling for the canned report
    let fetched = match client.debrief(&session_id).await {
        Ok(report) => Ok(report),
        Err(_) => client.debrief_by_id(&session_id).await,
    };
    let report = match fetched {
        Ok(report) => report,
        Err(e) => {
            if !quiet {
                eprintln!("Debrief unavailable ({e}); showing the sample report.");
            }
            tokio::time::sleep(Duration::from_millis(defaults::DEBRIEF_FALLBACK_DELAY_MS)).await;
            sample_debrief()
        }
    };

    render_debrief(&report, &company);
    Ok(())
}

/// List available audio input devices.
pub fn run_devices() -> Result<()> {
    suppress_audio_warnings();
    let devices = crate::audio::capture::list_devices()?;
    if devices.is_empty() {
        eprintln!("No audio input devices found.");
    } else {
        for device in devices {
            println!("{device}");
        }
    }
    Ok(())
}
