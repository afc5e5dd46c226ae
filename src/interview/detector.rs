//! Silence detection over per-frame amplitude levels.
//!
//! Decides, without server involvement, when the candidate has finished
//! speaking, so no manual "stop" action is needed. Levels arrive on a 0–255
//! scale (see [`crate::audio::encode::frame_level`]) at the recording loop's
//! polling cadence.

use crate::config::DetectorConfig;
use std::sync::Arc;
use std::time::Instant;

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Outcome of feeding one level sample to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceVerdict {
    /// Keep recording.
    Continue,
    /// The candidate has stopped speaking; stop recording and submit.
    Stop,
}

/// Amplitude-threshold silence detector for one recording phase.
///
/// Construction marks the start of speaking time; feed it one level per
/// captured frame. It fires [`SilenceVerdict::Stop`] exactly once, when the
/// level has stayed below the threshold continuously for the configured
/// silence duration, but never before the minimum speaking guard has
/// elapsed, so an initial breath or hesitation can't cut the answer short.
///
/// A candidate who never stops talking is bounded by the session timeout,
/// not by this detector.
pub struct SilenceDetector {
    config: DetectorConfig,
    clock: Arc<dyn Clock>,
    speak_start: Instant,
    silence_start: Option<Instant>,
    fired: bool,
}

impl SilenceDetector {
    /// Begin a recording phase using the system clock.
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Begin a recording phase with an injected clock.
    pub fn with_clock(config: DetectorConfig, clock: Arc<dyn Clock>) -> Self {
        let speak_start = clock.now();
        Self {
            config,
            clock,
            speak_start,
            silence_start: None,
            fired: false,
        }
    }

    /// Feed one frame level.
    pub fn sample(&mut self, level: f32) -> SilenceVerdict {
        if self.fired {
            return SilenceVerdict::Stop;
        }

        let now = self.clock.now();
        let spoken_enough = now.duration_since(self.speak_start).as_millis()
            > u128::from(self.config.min_speak_ms);

        if level < self.config.silence_threshold && spoken_enough {
            match self.silence_start {
                None => self.silence_start = Some(now),
                Some(start) => {
                    if now.duration_since(start).as_millis()
                        > u128::from(self.config.silence_duration_ms)
                    {
                        self.fired = true;
                        return SilenceVerdict::Stop;
                    }
                }
            }
        } else {
            // Silence must be continuous; any speech resets the window
            self.silence_start = None;
        }

        SilenceVerdict::Continue
    }

    /// Milliseconds of continuous silence accumulated so far.
    pub fn silence_ms(&self) -> u32 {
        self.silence_start
            .map(|start| self.clock.now().duration_since(start).as_millis() as u32)
            .unwrap_or(0)
    }

    /// Whether the detector has already fired.
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock clock for testing that allows manual time advancement.
    #[derive(Clone)]
    struct MockClock {
        current: Arc<Mutex<Instant>>,
    }

    impl MockClock {
        fn new() -> Self {
            Self {
                current: Arc::new(Mutex::new(Instant::now())),
            }
        }

        fn advance(&self, duration: Duration) {
            let mut current = self.current.lock().unwrap();
            *current += duration;
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.current.lock().unwrap()
        }
    }

    fn tuned_config() -> DetectorConfig {
        DetectorConfig {
            silence_threshold: 12.0,
            silence_duration_ms: 2200,
            min_speak_ms: 1500,
        }
    }

    fn detector_with_clock() -> (SilenceDetector, MockClock) {
        let clock = MockClock::new();
        let detector = SilenceDetector::with_clock(tuned_config(), Arc::new(clock.clone()));
        (detector, clock)
    }

    /// Feed `level` every 100ms for `duration_ms`, returning the first offset
    /// (ms from recording start) at which the detector fired, if any.
    fn feed(
        detector: &mut SilenceDetector,
        clock: &MockClock,
        level: f32,
        duration_ms: u64,
        start_offset: &mut u64,
    ) -> Option<u64> {
        let step = 100u64;
        let mut elapsed = 0u64;
        while elapsed < duration_ms {
            clock.advance(Duration::from_millis(step));
            elapsed += step;
            *start_offset += step;
            if detector.sample(level) == SilenceVerdict::Stop {
                return Some(*start_offset);
            }
        }
        None
    }

    #[test]
    fn test_never_fires_before_min_speak_guard() {
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        // Pure silence from the start: guard holds until 1500ms, then the
        // silence window must still run its full 2200ms
        let fired = feed(&mut detector, &clock, 0.0, 1500, &mut offset);
        assert_eq!(fired, None, "must not fire during the min-speak guard");
    }

    #[test]
    fn test_short_speech_then_pause_does_not_false_stop_early() {
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        // 800ms of speech (below the 1500ms guard), then a pause shorter than
        // the guard remainder
        assert_eq!(feed(&mut detector, &clock, 40.0, 800, &mut offset), None);
        assert_eq!(feed(&mut detector, &clock, 5.0, 600, &mut offset), None);
        assert!(!detector.has_fired());
    }

    #[test]
    fn test_typical_answer_trace_fires_near_3900ms() {
        // threshold=12, min-speak=1500ms, silence=2200ms;
        // level 40 for 1600ms then 5 for 2300ms → stop ≈ 3900ms
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        assert_eq!(feed(&mut detector, &clock, 40.0, 1600, &mut offset), None);
        let fired_at = feed(&mut detector, &clock, 5.0, 2300, &mut offset);

        let at = fired_at.expect("detector should fire");
        assert!(
            (3800..=4000).contains(&at),
            "expected fire near 3900ms, got {at}ms"
        );
    }

    #[test]
    fn test_fires_exactly_once() {
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        feed(&mut detector, &clock, 40.0, 1600, &mut offset);
        let first = feed(&mut detector, &clock, 5.0, 2400, &mut offset);
        assert!(first.is_some());
        assert!(detector.has_fired());

        // Further samples keep reporting Stop without a second "event"
        clock.advance(Duration::from_millis(100));
        assert_eq!(detector.sample(5.0), SilenceVerdict::Stop);
        assert_eq!(detector.sample(40.0), SilenceVerdict::Stop);
    }

    #[test]
    fn test_speech_resumption_resets_silence_window() {
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        feed(&mut detector, &clock, 40.0, 1600, &mut offset);

        // 2000ms of silence, window almost complete
        assert_eq!(feed(&mut detector, &clock, 5.0, 2000, &mut offset), None);

        // Speech resumes, the window resets entirely
        assert_eq!(feed(&mut detector, &clock, 40.0, 300, &mut offset), None);

        // Another 2000ms of silence still isn't enough on its own
        assert_eq!(feed(&mut detector, &clock, 5.0, 2000, &mut offset), None);

        // But a full continuous window after that fires
        let fired = feed(&mut detector, &clock, 5.0, 400, &mut offset);
        assert!(fired.is_some());
    }

    #[test]
    fn test_continuous_speech_never_fires() {
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        let fired = feed(&mut detector, &clock, 40.0, 60_000, &mut offset);
        assert_eq!(fired, None, "a talker who never pauses is not cut off");
    }

    #[test]
    fn test_level_exactly_at_threshold_counts_as_speech() {
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        feed(&mut detector, &clock, 40.0, 1600, &mut offset);
        // Level equal to the threshold is not "below" it
        let fired = feed(&mut detector, &clock, 12.0, 3000, &mut offset);
        assert_eq!(fired, None);
    }

    #[test]
    fn test_silence_ms_reports_window_progress() {
        let (mut detector, clock) = detector_with_clock();
        let mut offset = 0u64;

        feed(&mut detector, &clock, 40.0, 1600, &mut offset);
        assert_eq!(detector.silence_ms(), 0);

        feed(&mut detector, &clock, 5.0, 1000, &mut offset);
        // First sub-threshold sample opened the window ~1000ms ago
        let silence = detector.silence_ms();
        assert!((800..=1100).contains(&silence), "got {silence}");

        // Speech resets the readout
        detector.sample(40.0);
        assert_eq!(detector.silence_ms(), 0);
    }

    #[test]
    fn test_system_clock_detector_construction() {
        let detector = SilenceDetector::new(DetectorConfig::default());
        assert!(!detector.has_fired());
    }
}
