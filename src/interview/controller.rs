//! The voice turn controller.
//!
//! Drives one interview session end to end: record the candidate's answer
//! until silence (or a manual stop, or the session timeout), submit it to the
//! remote turn exchange, play the interviewer's reply, and loop until the
//! exchange marks the interview complete. All phases run on the single status
//! value in [`StatusCell`], so turns are strictly sequential by construction.

use crate::api::mock::FallbackScript;
use crate::api::types::VoiceReply;
use crate::api::TurnExchange;
use crate::audio::encode::{encode_answer, frame_level};
use crate::audio::playback::SpeechPlayer;
use crate::audio::recorder::AudioSource;
use crate::config::DetectorConfig;
use crate::defaults;
use crate::error::Result;
use crate::interview::detector::{Clock, SilenceDetector, SilenceVerdict, SystemClock};
use crate::interview::status::{Status, StatusCell};
use crate::session::Turn;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub use crate::session::Role;

/// Commands the user can issue while the interview runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Stop the current recording and submit what was captured.
    StopRecording,
    /// End the interview early.
    EndInterview,
}

/// Progress events emitted by the controller, rendered by an [`EventSink`].
#[derive(Debug, Clone)]
pub enum InterviewEvent {
    StatusChanged(Status),
    /// The interviewer's current line, shown while it plays.
    InterviewerLine {
        text: String,
        translation: Option<String>,
    },
    /// A turn became part of the transcript.
    TurnAppended(Turn),
    /// Live recording feedback, one per captured frame.
    Meter {
        level: f32,
        threshold: f32,
        silence_ms: u32,
        remaining_secs: u64,
    },
    /// The server overrode the local countdown.
    TimerSynced { remaining_secs: u64 },
    QuestionChanged(u32),
    /// The exchange failed; this turn came from the offline script.
    FellBack { reason: String },
    /// Diagnostic detail (verbose output).
    Note(String),
}

/// Consumer of interview events.
pub trait EventSink: Send {
    fn emit(&mut self, event: InterviewEvent);
}

/// Sink that drops everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: InterviewEvent) {}
}

/// Sink that collects events for inspection in tests.
#[derive(Default)]
pub struct CollectorSink {
    events: Arc<Mutex<Vec<InterviewEvent>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collected events, usable after the sink has been moved
    /// into the controller.
    pub fn handle(&self) -> Arc<Mutex<Vec<InterviewEvent>>> {
        Arc::clone(&self.events)
    }
}

impl EventSink for CollectorSink {
    fn emit(&mut self, event: InterviewEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Tuning for one interview run.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub detector: DetectorConfig,
    /// Total session length; hitting it during recording stops the recording.
    pub session_duration: Duration,
    /// Polling cadence of the recording loop.
    pub frame_interval: Duration,
    /// Back-off when the source had no samples yet.
    pub empty_poll: Duration,
    /// Dwell floor when a reply carries no audio.
    pub speak_floor: Duration,
    /// Dwell per character when a reply carries no audio.
    pub speak_per_char: Duration,
    /// Pause after the closing line before the controller returns.
    pub complete_delay: Duration,
    /// Remaining time at or below which the offline fallback closes the
    /// interview.
    pub closing_window: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            session_duration: Duration::from_secs(defaults::SESSION_DURATION_MINUTES * 60),
            frame_interval: Duration::from_millis(defaults::FRAME_INTERVAL_MS),
            empty_poll: Duration::from_millis(10),
            speak_floor: Duration::from_millis(defaults::SPEAK_FLOOR_MS),
            speak_per_char: Duration::from_millis(defaults::SPEAK_PER_CHAR_MS),
            complete_delay: Duration::from_millis(defaults::COMPLETE_DELAY_MS),
            closing_window: Duration::from_secs(defaults::CLOSING_WINDOW_SECS),
        }
    }
}

/// How one interview run ended.
#[derive(Debug)]
pub struct InterviewOutcome {
    pub transcript: Vec<Turn>,
    /// True when the exchange (or fallback) marked the interview complete.
    pub completed: bool,
    /// True when the user ended the interview before completion.
    pub ended_early: bool,
    pub questions_asked: u32,
}

/// Why a recording phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordEnd {
    Silence,
    Manual,
    Timeout,
}

/// The interview session driver. See module docs.
pub struct TurnController {
    config: ControllerConfig,
    session_id: String,
    source: Box<dyn AudioSource>,
    exchange: Arc<dyn TurnExchange>,
    player: Box<dyn SpeechPlayer>,
    sink: Box<dyn EventSink>,
    clock: Arc<dyn Clock>,
    commands: Option<mpsc::UnboundedReceiver<ControlCommand>>,
    fallback: FallbackScript,
    status: StatusCell,
    transcript: Vec<Turn>,
    question_number: u32,
    sample_rate: u32,
    deadline: Instant,
}

impl TurnController {
    pub fn new(
        session_id: impl Into<String>,
        config: ControllerConfig,
        source: Box<dyn AudioSource>,
        exchange: Arc<dyn TurnExchange>,
        player: Box<dyn SpeechPlayer>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let deadline = clock.now() + config.session_duration;
        Self {
            config,
            session_id: session_id.into(),
            source,
            exchange,
            player,
            sink,
            clock,
            commands: None,
            fallback: FallbackScript::new(),
            status: StatusCell::new(),
            transcript: Vec::new(),
            question_number: 0,
            sample_rate: defaults::SAMPLE_RATE,
            deadline,
        }
    }

    /// Attach a command channel (manual stop / early end).
    pub fn with_commands(mut self, commands: mpsc::UnboundedReceiver<ControlCommand>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Seconds left on the session countdown.
    pub fn remaining_secs(&self) -> u64 {
        self.deadline
            .saturating_duration_since(self.clock.now())
            .as_secs()
    }

    /// Run the interview to completion.
    ///
    /// The first turn is the scripted opening question (served locally, the
    /// backend never supplies it); every following interviewer line comes
    /// from the exchange or, on transport failure, the offline script.
    pub async fn run(&mut self) -> Result<InterviewOutcome> {
        self.deadline = self.clock.now() + self.config.session_duration;

        self.question_number = 1;
        self.sink.emit(InterviewEvent::QuestionChanged(1));
        let opening = self.fallback.opening();
        let mut done = self.speak(opening).await?;

        while !done {
            let Some(payload) = self.record_turn().await? else {
                // Early end: countdown and stream are already torn down
                return Ok(self.outcome(false, true));
            };

            let reply = self.submit(&payload).await;
            done = self.speak(reply).await?;
        }

        // Let the closing line land before moving on to the debrief
        tokio::time::sleep(self.config.complete_delay).await;

        Ok(self.outcome(true, false))
    }

    fn outcome(&mut self, completed: bool, ended_early: bool) -> InterviewOutcome {
        InterviewOutcome {
            transcript: std::mem::take(&mut self.transcript),
            completed,
            ended_early,
            questions_asked: self.question_number,
        }
    }

    /// Capture one answer. Returns the base64 WAV payload, or `None` when the
    /// user ended the interview.
    async fn record_turn(&mut self) -> Result<Option<String>> {
        // Acquire the stream first: if the microphone is unavailable the
        // recording never starts and the status stays idle.
        self.source.start()?;

        if !self.status.advance(Status::Recording) {
            // Already recording (or not idle); starting again is a no-op
            self.source.stop()?;
            return Ok(None);
        }
        self.sink
            .emit(InterviewEvent::StatusChanged(Status::Recording));

        let mut buffer: Vec<i16> = Vec::new();
        let mut detector =
            SilenceDetector::with_clock(self.config.detector.clone(), Arc::clone(&self.clock));

        let end = loop {
            match self.poll_command() {
                Some(ControlCommand::EndInterview) => {
                    self.source.stop()?;
                    self.sink
                        .emit(InterviewEvent::Note("interview ended early".to_string()));
                    return Ok(None);
                }
                Some(ControlCommand::StopRecording) => break RecordEnd::Manual,
                None => {}
            }

            if self.clock.now() >= self.deadline {
                break RecordEnd::Timeout;
            }

            let samples = self.source.read_samples()?;
            if samples.is_empty() {
                tokio::time::sleep(self.config.empty_poll).await;
                continue;
            }

            let level = frame_level(&samples);
            buffer.extend_from_slice(&samples);

            let meter = InterviewEvent::Meter {
                level,
                threshold: self.config.detector.silence_threshold,
                silence_ms: detector.silence_ms(),
                remaining_secs: self.remaining_secs(),
            };
            self.sink.emit(meter);

            if detector.sample(level) == SilenceVerdict::Stop {
                break RecordEnd::Silence;
            }

            tokio::time::sleep(self.config.frame_interval).await;
        };

        // Tear the stream down before leaving the recording state so no
        // device handle survives into the next phase
        self.source.stop()?;

        self.status.advance(Status::Processing);
        self.sink
            .emit(InterviewEvent::StatusChanged(Status::Processing));
        self.sink.emit(InterviewEvent::Note(format!(
            "recording ended ({})",
            match end {
                RecordEnd::Silence => "silence detected",
                RecordEnd::Manual => "manual stop",
                RecordEnd::Timeout => "session timeout",
            }
        )));

        let turn = Turn::candidate(defaults::CANDIDATE_ACK);
        self.transcript.push(turn.clone());
        self.sink.emit(InterviewEvent::TurnAppended(turn));

        let payload = encode_answer(&buffer, self.sample_rate)?;
        Ok(Some(payload))
    }

    /// Submit the answer and produce exactly one interviewer reply: from the
    /// exchange when it succeeds, from the offline script when it doesn't.
    async fn submit(&mut self, payload: &str) -> VoiceReply {
        let result = {
            let exchange = Arc::clone(&self.exchange);
            exchange.exchange(&self.session_id, payload).await
        };
        match result {
            Ok(reply) => {
                // Server counters are authoritative when present
                if let Some(secs) = reply.time_remaining_seconds {
                    self.deadline = self.clock.now() + Duration::from_secs(secs);
                    self.sink.emit(InterviewEvent::TimerSynced {
                        remaining_secs: secs,
                    });
                }
                if let Some(number) = reply.question_number {
                    self.question_number = number;
                } else {
                    self.question_number += 1;
                }
                self.sink
                    .emit(InterviewEvent::QuestionChanged(self.question_number));
                reply
            }
            Err(e) => {
                self.sink.emit(InterviewEvent::FellBack {
                    reason: e.to_string(),
                });
                self.question_number += 1;
                self.sink
                    .emit(InterviewEvent::QuestionChanged(self.question_number));

                let time_up = self.remaining_secs() <= self.config.closing_window.as_secs();
                self.fallback.next_reply(self.question_number, time_up)
            }
        }
    }

    /// Present the interviewer's line, holding the speaking state until the
    /// audio (or the simulated dwell) finishes. Resolves to exactly one
    /// transition: loop (false) or complete (true).
    async fn speak(&mut self, reply: VoiceReply) -> Result<bool> {
        // The opening line plays before the first recording, while the status
        // is still idle: it stays outside the state machine (no idle→speaking
        // edge exists), which also keeps the very first recording start
        // waiting on the explicit begin.
        let entered_speaking = self.status.advance(Status::Speaking);
        if entered_speaking {
            self.sink
                .emit(InterviewEvent::StatusChanged(Status::Speaking));
        }
        self.sink.emit(InterviewEvent::InterviewerLine {
            text: reply.response_text.clone(),
            translation: reply.response_jp.clone(),
        });

        match &reply.audio_base64 {
            Some(encoded) => match BASE64.decode(encoded) {
                Ok(mp3) => {
                    let played = self.player.play_mp3(&mp3).await;
                    if let Err(e) = played {
                        // A playback error still resolves the wait
                        self.sink
                            .emit(InterviewEvent::Note(format!("playback failed: {e}")));
                    }
                }
                Err(e) => {
                    self.sink
                        .emit(InterviewEvent::Note(format!("bad audio payload: {e}")));
                }
            },
            None => {
                tokio::time::sleep(self.dwell_for(&reply.response_text)).await;
            }
        }

        let turn = Turn::interviewer(reply.response_text, reply.response_jp);
        self.transcript.push(turn.clone());
        self.sink.emit(InterviewEvent::TurnAppended(turn));

        if reply.interview_complete {
            if self.status.advance(Status::Complete) {
                self.sink
                    .emit(InterviewEvent::StatusChanged(Status::Complete));
            }
            Ok(true)
        } else {
            if entered_speaking && self.status.advance(Status::Idle) {
                self.sink.emit(InterviewEvent::StatusChanged(Status::Idle));
            }
            Ok(false)
        }
    }

    /// Simulated speaking time for a reply without synthesized audio: a fixed
    /// floor plus a per-character increment.
    fn dwell_for(&self, text: &str) -> Duration {
        let by_length = self.config.speak_per_char * text.chars().count() as u32;
        by_length.max(self.config.speak_floor)
    }

    fn poll_command(&mut self) -> Option<ControlCommand> {
        self.commands.as_mut()?.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ScriptedExchange, SCRIPTED_EXCHANGES};
    use crate::audio::playback::MockSpeechPlayer;
    use crate::audio::recorder::MockAudioSource;
    use crate::error::MensetsuError;

    /// Config scaled down so a full turn runs in tens of milliseconds.
    fn fast_config() -> ControllerConfig {
        ControllerConfig {
            detector: DetectorConfig {
                silence_threshold: 12.0,
                silence_duration_ms: 30,
                min_speak_ms: 10,
            },
            session_duration: Duration::from_secs(600),
            frame_interval: Duration::from_millis(5),
            empty_poll: Duration::from_millis(2),
            speak_floor: Duration::from_millis(5),
            speak_per_char: Duration::from_millis(0),
            complete_delay: Duration::from_millis(5),
            closing_window: Duration::from_secs(30),
        }
    }

    /// A source that speaks briefly, then goes quiet forever.
    fn speaking_source() -> MockAudioSource {
        MockAudioSource::new()
            .with_frames(vec![vec![4000i16; 160], vec![4000i16; 160]])
            .with_tail(vec![0i16; 160])
    }

    fn reply(text: &str, complete: bool) -> VoiceReply {
        VoiceReply {
            response_text: text.to_string(),
            response_jp: None,
            audio_base64: None,
            interview_complete: complete,
            time_remaining_seconds: None,
            question_number: None,
        }
    }

    fn controller_with(
        config: ControllerConfig,
        source: MockAudioSource,
        exchange: Arc<ScriptedExchange>,
        sink: CollectorSink,
    ) -> TurnController {
        TurnController::new(
            "sess-test",
            config,
            Box::new(source),
            exchange,
            Box::new(MockSpeechPlayer::new()),
            Box::new(sink),
        )
    }

    fn statuses(events: &[InterviewEvent]) -> Vec<Status> {
        events
            .iter()
            .filter_map(|e| match e {
                InterviewEvent::StatusChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_full_interview_until_complete() {
        let exchange = Arc::new(ScriptedExchange::new(vec![
            Ok(reply("Second question?", false)),
            Ok(reply("Thank you for your time.", true)),
        ]));
        let sink = CollectorSink::new();
        let events = sink.handle();

        let mut controller = controller_with(fast_config(), speaking_source(), exchange.clone(), sink);
        let outcome = controller.run().await.unwrap();

        assert!(outcome.completed);
        assert!(!outcome.ended_early);
        assert_eq!(exchange.calls().len(), 2);

        // Transcript: opening, ack, q2, ack, closing
        let transcript = &outcome.transcript;
        assert_eq!(transcript.len(), 5);
        assert_eq!(transcript[0].role, Role::Interviewer);
        assert_eq!(transcript[0].text, SCRIPTED_EXCHANGES[0].en);
        assert_eq!(transcript[1].role, Role::Candidate);
        assert_eq!(transcript[1].text, defaults::CANDIDATE_ACK);
        assert_eq!(transcript[4].text, "Thank you for your time.");

        assert_eq!(controller.status(), Status::Complete);

        // Every emitted status change walked a legal edge
        let seen = statuses(&events.lock().unwrap());
        let mut cell = StatusCell::new();
        // First event is Speaking (the opening line)
        for status in seen {
            assert!(cell.advance(status), "illegal transition to {status}");
        }
    }

    #[tokio::test]
    async fn test_no_recording_after_complete() {
        let exchange = Arc::new(ScriptedExchange::new(vec![Ok(reply("Goodbye.", true))]));
        let source = speaking_source();

        let mut controller = TurnController::new(
            "sess-test",
            fast_config(),
            Box::new(source),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        );
        let outcome = controller.run().await.unwrap();

        assert!(outcome.completed);
        // One answer was recorded, then the closing reply ended the session:
        // exactly one submission, no further recording starts
        assert_eq!(exchange.calls().len(), 1);
        assert_eq!(controller.status(), Status::Complete);
    }

    #[tokio::test]
    async fn test_transport_failure_produces_exactly_one_scripted_line() {
        let exchange = Arc::new(ScriptedExchange::unreachable());
        let sink = CollectorSink::new();
        let events = sink.handle();

        // Short session so the scripted fallback reaches its closing line
        let mut config = fast_config();
        config.session_duration = Duration::from_secs(10);
        // remaining (≈10s) is inside the closing window → first fallback closes
        let mut controller = controller_with(config, speaking_source(), exchange.clone(), sink);
        let outcome = controller.run().await.unwrap();

        assert!(outcome.completed);
        assert_eq!(exchange.calls().len(), 1);

        // Exactly one fallback event and one closing line
        let events = events.lock().unwrap();
        let fellback = events
            .iter()
            .filter(|e| matches!(e, InterviewEvent::FellBack { .. }))
            .count();
        assert_eq!(fellback, 1);

        let closing = SCRIPTED_EXCHANGES[SCRIPTED_EXCHANGES.len() - 1].en;
        let interviewer_lines: Vec<_> = outcome
            .transcript
            .iter()
            .filter(|t| t.role == Role::Interviewer)
            .collect();
        assert_eq!(interviewer_lines.len(), 2); // opening + closing
        assert_eq!(interviewer_lines[1].text, closing);
    }

    #[tokio::test]
    async fn test_fallback_keeps_interview_going_when_time_remains() {
        let exchange = Arc::new(ScriptedExchange::new(vec![
            Err(MensetsuError::Api {
                message: "connection refused".to_string(),
            }),
            Ok(reply("Wrapping up.", true)),
        ]));

        let mut controller = TurnController::new(
            "sess-test",
            fast_config(),
            Box::new(speaking_source()),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        );
        let outcome = controller.run().await.unwrap();

        assert!(outcome.completed);
        assert_eq!(exchange.calls().len(), 2);

        // The failed turn still produced exactly one interviewer line, from
        // the script, and it did not end the interview
        let interviewer_lines: Vec<_> = outcome
            .transcript
            .iter()
            .filter(|t| t.role == Role::Interviewer)
            .collect();
        assert_eq!(interviewer_lines.len(), 3);
        assert_eq!(interviewer_lines[1].text, SCRIPTED_EXCHANGES[2].en);
    }

    #[tokio::test]
    async fn test_server_time_override_rewrites_countdown() {
        let mut authoritative = reply("Next.", false);
        authoritative.time_remaining_seconds = Some(42);
        authoritative.question_number = Some(7);

        let exchange = Arc::new(ScriptedExchange::new(vec![
            Ok(authoritative),
            Ok(reply("Done.", true)),
        ]));
        let sink = CollectorSink::new();
        let events = sink.handle();

        let mut controller = controller_with(fast_config(), speaking_source(), exchange, sink);
        let outcome = controller.run().await.unwrap();

        // 42s anchor applied mid-run; a moment later the countdown reads ~42
        let synced = events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, InterviewEvent::TimerSynced { remaining_secs: 42 }));
        assert!(synced);

        // Server question number overrode the local counter (7, then +1 local)
        assert_eq!(outcome.questions_asked, 8);
    }

    #[tokio::test]
    async fn test_session_timeout_stops_recording_and_submits() {
        let exchange = Arc::new(ScriptedExchange::unreachable());

        let mut config = fast_config();
        // Deadline hits almost immediately; detector would need 10s
        config.session_duration = Duration::from_millis(50);
        config.detector.min_speak_ms = 10_000;
        config.detector.silence_duration_ms = 10_000;

        let mut controller = TurnController::new(
            "sess-test",
            config,
            Box::new(speaking_source()),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        );
        let outcome = controller.run().await.unwrap();

        // Timed-out recording was still submitted, and the fallback (time up)
        // closed the interview
        assert!(outcome.completed);
        assert_eq!(exchange.calls().len(), 1);
        assert_eq!(controller.status(), Status::Complete);
    }

    #[tokio::test]
    async fn test_manual_stop_command_submits_recording() {
        let exchange = Arc::new(ScriptedExchange::new(vec![Ok(reply("Done.", true))]));
        let (tx, rx) = mpsc::unbounded_channel();

        let mut config = fast_config();
        // Detector alone would never fire within the test
        config.detector.min_speak_ms = 10_000;
        config.detector.silence_duration_ms = 10_000;

        let mut controller = TurnController::new(
            "sess-test",
            config,
            Box::new(speaking_source()),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        )
        .with_commands(rx);

        tx.send(ControlCommand::StopRecording).unwrap();
        let outcome = controller.run().await.unwrap();

        assert!(outcome.completed);
        assert_eq!(exchange.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_end_interview_command_cancels_cleanly() {
        let exchange = Arc::new(ScriptedExchange::unreachable());
        let (tx, rx) = mpsc::unbounded_channel();

        let mut config = fast_config();
        config.detector.min_speak_ms = 10_000;
        config.detector.silence_duration_ms = 10_000;

        let mut controller = TurnController::new(
            "sess-test",
            config,
            Box::new(speaking_source()),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        )
        .with_commands(rx);

        tx.send(ControlCommand::EndInterview).unwrap();
        let outcome = controller.run().await.unwrap();

        assert!(outcome.ended_early);
        assert!(!outcome.completed);
        // Nothing was ever submitted
        assert!(exchange.calls().is_empty());
    }

    #[tokio::test]
    async fn test_microphone_failure_never_starts_recording() {
        let exchange = Arc::new(ScriptedExchange::unreachable());
        let source = MockAudioSource::new()
            .with_start_failure()
            .with_error_message("permission denied");

        let mut controller = TurnController::new(
            "sess-test",
            fast_config(),
            Box::new(source),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        );
        let result = controller.run().await;

        assert!(matches!(
            result,
            Err(MensetsuError::AudioCapture { .. })
        ));
        // The opening line played, but no recording ever started
        assert!(exchange.calls().is_empty());
        assert_eq!(controller.status(), Status::Idle);
    }

    #[tokio::test]
    async fn test_playback_failure_still_resolves_to_one_transition() {
        let mut with_audio = reply("Line with audio.", false);
        with_audio.audio_base64 = Some(BASE64.encode(b"not really mp3"));

        let exchange = Arc::new(ScriptedExchange::new(vec![
            Ok(with_audio),
            Ok(reply("Done.", true)),
        ]));

        let mut controller = TurnController::new(
            "sess-test",
            fast_config(),
            Box::new(speaking_source()),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new().with_failure()),
            Box::new(NullSink),
        );
        let outcome = controller.run().await.unwrap();

        // The broken audio line neither stalled nor duplicated the turn
        assert!(outcome.completed);
        let interviewer_lines: Vec<_> = outcome
            .transcript
            .iter()
            .filter(|t| t.role == Role::Interviewer)
            .collect();
        assert_eq!(interviewer_lines.len(), 3);
    }

    #[tokio::test]
    async fn test_dwell_scales_with_text_length() {
        let config = ControllerConfig::default();
        let controller = TurnController::new(
            "sess-test",
            config,
            Box::new(MockAudioSource::new()),
            Arc::new(ScriptedExchange::unreachable()),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        );

        // Short text hits the floor
        assert_eq!(controller.dwell_for("Hi."), Duration::from_millis(1500));

        // 100 chars * 45ms = 4500ms > floor
        let long = "a".repeat(100);
        assert_eq!(controller.dwell_for(&long), Duration::from_millis(4500));
    }

    #[tokio::test]
    async fn test_submissions_carry_wav_payload() {
        let exchange = Arc::new(ScriptedExchange::new(vec![Ok(reply("Done.", true))]));

        let mut controller = TurnController::new(
            "sess-test",
            fast_config(),
            Box::new(speaking_source()),
            exchange.clone(),
            Box::new(MockSpeechPlayer::new()),
            Box::new(NullSink),
        );
        controller.run().await.unwrap();

        let calls = exchange.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "sess-test");

        let wav = BASE64.decode(&calls[0].1).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
    }
}
