use crate::error::{MensetsuError, Result};
use std::collections::VecDeque;

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    ///
    /// Must release the underlying device stream; the interview loop relies
    /// on this to avoid leaking open device handles across turns.
    fn stop(&mut self) -> Result<()>;

    /// Read audio samples captured since the last call.
    ///
    /// # Returns
    /// Vector of 16-bit PCM audio samples, possibly empty
    fn read_samples(&mut self) -> Result<Vec<i16>>;
}

/// Mock audio source for testing.
///
/// Frames are played back in order; once exhausted, reads return the
/// configured tail frame (silence by default) forever, mimicking a live
/// microphone that keeps delivering quiet input.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    frames: VecDeque<Vec<i16>>,
    tail: Vec<i16>,
    is_started: bool,
    start_count: usize,
    stop_count: usize,
    should_fail_start: bool,
    should_fail_stop: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source that only produces silence.
    pub fn new() -> Self {
        Self {
            frames: VecDeque::new(),
            tail: vec![0i16; 160],
            is_started: false,
            start_count: 0,
            stop_count: 0,
            should_fail_start: false,
            should_fail_stop: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return the given frames in order.
    pub fn with_frames(mut self, frames: Vec<Vec<i16>>) -> Self {
        self.frames = frames.into();
        self
    }

    /// Configure the frame returned after the scripted frames run out.
    pub fn with_tail(mut self, tail: Vec<i16>) -> Self {
        self.tail = tail;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on stop
    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// Number of times `start` succeeded.
    pub fn start_count(&self) -> usize {
        self.start_count
    }

    /// Number of times `stop` succeeded.
    pub fn stop_count(&self) -> usize {
        self.stop_count
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(MensetsuError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            self.start_count += 1;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        if self.should_fail_stop {
            Err(MensetsuError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = false;
            self.stop_count += 1;
            Ok(())
        }
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            Err(MensetsuError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            Ok(self.frames.pop_front().unwrap_or_else(|| self.tail.clone()))
        }
    }
}
