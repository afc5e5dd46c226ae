//! Audio capture, encoding and playback.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod encode;
pub mod playback;
pub mod recorder;

pub use encode::{encode_answer, frame_level, samples_to_wav};
pub use playback::{MockSpeechPlayer, SpeechPlayer};
pub use recorder::{AudioSource, MockAudioSource};

#[cfg(feature = "cpal-audio")]
pub use capture::{CpalAudioSource, list_devices, suppress_audio_warnings};
#[cfg(feature = "cpal-audio")]
pub use playback::CpalSpeechPlayer;
