//! Interviewer speech playback.
//!
//! The coaching API synthesizes the interviewer's line as MP3; this module
//! decodes it and plays it on the default output device. Playback sits behind
//! the [`SpeechPlayer`] trait so the interview loop can be tested without
//! speakers.

use crate::error::{MensetsuError, Result};
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Trait for playing a synthesized interviewer line.
#[async_trait]
pub trait SpeechPlayer: Send {
    /// Play MP3 audio to completion. Returns once playback finishes.
    async fn play_mp3(&mut self, data: &[u8]) -> Result<()>;
}

/// Decode MP3 bytes to f32 samples.
///
/// Returns the samples (downmixed to mono) and the sample rate of the stream.
pub fn decode_mp3(mp3_data: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                }

                if frame.channels == 2 {
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        (left + right) / 2.0
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => {
                return Err(MensetsuError::Playback {
                    message: format!("MP3 decode error: {e}"),
                });
            }
        }
    }

    if samples.is_empty() {
        return Err(MensetsuError::Playback {
            message: "MP3 payload contained no audio".to_string(),
        });
    }

    Ok((samples, sample_rate))
}

/// Mock player for testing. Records the byte length of each played payload.
#[derive(Debug, Clone, Default)]
pub struct MockSpeechPlayer {
    played: Arc<Mutex<Vec<usize>>>,
    should_fail: bool,
}

impl MockSpeechPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on every play.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Handle to the recorded payload lengths, usable after the player has
    /// been moved into the interview loop.
    pub fn played(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.played)
    }
}

#[async_trait]
impl SpeechPlayer for MockSpeechPlayer {
    async fn play_mp3(&mut self, data: &[u8]) -> Result<()> {
        if self.should_fail {
            return Err(MensetsuError::Playback {
                message: "mock playback error".to_string(),
            });
        }
        if let Ok(mut played) = self.played.lock() {
            played.push(data.len());
        }
        Ok(())
    }
}

#[cfg(feature = "cpal-audio")]
pub use cpal_player::CpalSpeechPlayer;

#[cfg(feature = "cpal-audio")]
mod cpal_player {
    use super::{SpeechPlayer, decode_mp3};
    use crate::error::{MensetsuError, Result};
    use async_trait::async_trait;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use std::sync::{Arc, Mutex};

    /// Plays decoded speech on the default output device.
    ///
    /// The device and stream are built per call inside a blocking task:
    /// cpal streams are not `Send`, and a line of interviewer speech is long
    /// enough that setup cost is irrelevant.
    pub struct CpalSpeechPlayer;

    impl CpalSpeechPlayer {
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for CpalSpeechPlayer {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl SpeechPlayer for CpalSpeechPlayer {
        async fn play_mp3(&mut self, data: &[u8]) -> Result<()> {
            let (samples, sample_rate) = decode_mp3(data)?;

            tokio::task::spawn_blocking(move || play_samples_blocking(&samples, sample_rate))
                .await
                .map_err(|e| MensetsuError::Playback {
                    message: format!("playback task failed: {e}"),
                })?
        }
    }

    /// Play mono f32 samples to the default output device, blocking until done.
    fn play_samples_blocking(samples: &[f32], sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| MensetsuError::Playback {
                message: "no output device available".to_string(),
            })?;

        let supported = device
            .supported_output_configs()
            .map_err(|e| MensetsuError::Playback {
                message: e.to_string(),
            })?
            .find(|c| {
                c.channels() <= 2
                    && c.min_sample_rate() <= sample_rate
                    && c.max_sample_rate() >= sample_rate
            })
            .ok_or_else(|| MensetsuError::Playback {
                message: format!("no output config supports {sample_rate}Hz"),
            })?;

        let config = supported
            .with_sample_rate(sample_rate)
            .config();
        let channels = config.channels as usize;

        let shared = Arc::new(Mutex::new((samples.to_vec(), 0usize, false)));
        let writer_state = Arc::clone(&shared);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut state) = writer_state.lock() else {
                        return;
                    };
                    let (samples, pos, finished) = &mut *state;
                    for frame in data.chunks_mut(channels) {
                        let sample = if *pos < samples.len() {
                            let s = samples[*pos];
                            *pos += 1;
                            s
                        } else {
                            *finished = true;
                            0.0
                        };
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| {
                    eprintln!("Audio playback error: {}", err);
                },
                None,
            )
            .map_err(|e| MensetsuError::Playback {
                message: e.to_string(),
            })?;

        stream.play().map_err(|e| MensetsuError::Playback {
            message: e.to_string(),
        })?;

        // Wait for the writer to drain, bounded by the audio's own duration
        let duration_ms = samples.len() as u64 * 1000 / u64::from(sample_rate.max(1));
        let timeout = std::time::Duration::from_millis(duration_ms + 500);
        let start = std::time::Instant::now();

        loop {
            let finished = shared.lock().map(|state| state.2).unwrap_or(true);
            if finished || start.elapsed() > timeout {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        // Let the device flush the last buffer
        std::thread::sleep(std::time::Duration::from_millis(100));

        drop(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_player_records_payload_lengths() {
        let mut player = MockSpeechPlayer::new();
        let played = player.played();

        player.play_mp3(&[0u8; 10]).await.unwrap();
        player.play_mp3(&[0u8; 20]).await.unwrap();

        assert_eq!(*played.lock().unwrap(), vec![10, 20]);
    }

    #[tokio::test]
    async fn test_mock_player_failure() {
        let mut player = MockSpeechPlayer::new().with_failure();
        let result = player.play_mp3(&[0u8; 10]).await;
        assert!(matches!(result, Err(MensetsuError::Playback { .. })));
    }

    #[test]
    fn test_decode_mp3_rejects_garbage() {
        // minimp3 skips garbage looking for a sync word; with none found the
        // decode yields no audio
        let result = decode_mp3(&[0x00, 0x01, 0x02, 0x03]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_mp3_rejects_empty_input() {
        assert!(decode_mp3(&[]).is_err());
    }
}
