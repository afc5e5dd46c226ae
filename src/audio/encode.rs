//! Answer payload encoding and amplitude levels.

use crate::defaults;
use crate::error::{MensetsuError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Average absolute amplitude of a frame, mapped onto a 0–255 scale.
///
/// This is the level the silence detector thresholds against; full-scale PCM
/// maps to 255, digital silence to 0.
pub fn frame_level(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f64 = samples.iter().map(|&s| (s as f64).abs()).sum();
    let mean = sum / samples.len() as f64;
    (mean / i16::MAX as f64 * defaults::LEVEL_SCALE as f64) as f32
}

/// Encode 16-bit PCM samples as an in-memory WAV file (mono).
pub fn samples_to_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| MensetsuError::AudioCapture {
                message: format!("Failed to encode WAV: {e}"),
            })?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| MensetsuError::AudioCapture {
                    message: format!("Failed to encode WAV: {e}"),
                })?;
        }
        writer
            .finalize()
            .map_err(|e| MensetsuError::AudioCapture {
                message: format!("Failed to encode WAV: {e}"),
            })?;
    }

    Ok(cursor.into_inner())
}

/// Package a recorded answer for submission: WAV-encode and base64.
pub fn encode_answer(samples: &[i16], sample_rate: u32) -> Result<String> {
    let wav = samples_to_wav(samples, sample_rate)?;
    Ok(BASE64.encode(wav))
}

/// Mix multi-channel audio down to mono by averaging channels.
pub fn downmix_to_mono(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
