use crate::defaults;
use crate::error::{MensetsuError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub detector: DetectorConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Silence detector tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Amplitude level (0–255 scale) below which a frame counts as silence.
    pub silence_threshold: f32,
    /// Continuous silence (ms) before the answer is submitted.
    pub silence_duration_ms: u32,
    /// Minimum speaking time (ms) before silence detection may fire.
    pub min_speak_ms: u32,
}

/// Coaching API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Interview session defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub duration_minutes: u64,
    pub language: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            silence_threshold: defaults::SILENCE_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            min_speak_ms: defaults::MIN_SPEAK_MS,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_secs: defaults::API_TIMEOUT_SECS,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: defaults::SESSION_DURATION_MINUTES,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MensetsuError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                MensetsuError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if the file doesn't
    /// exist. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(MensetsuError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Write the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MensetsuError::Other(format!("Failed to serialize config: {e}")))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MENSETSU_API_URL → api.base_url
    /// - MENSETSU_AUDIO_DEVICE → audio.device
    /// - MENSETSU_LANGUAGE → session.language
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("MENSETSU_API_URL")
            && !url.is_empty()
        {
            self.api.base_url = url;
        }

        if let Ok(device) = std::env::var("MENSETSU_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(language) = std::env::var("MENSETSU_LANGUAGE")
            && !language.is_empty()
        {
            self.session.language = language;
        }

        self
    }

    /// Get a configuration value by dotted key (e.g., `detector.silence_threshold`).
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "audio.device" => self.audio.device.clone().unwrap_or_default(),
            "audio.sample_rate" => self.audio.sample_rate.to_string(),
            "detector.silence_threshold" => self.detector.silence_threshold.to_string(),
            "detector.silence_duration_ms" => self.detector.silence_duration_ms.to_string(),
            "detector.min_speak_ms" => self.detector.min_speak_ms.to_string(),
            "api.base_url" => self.api.base_url.clone(),
            "api.timeout_secs" => self.api.timeout_secs.to_string(),
            "session.duration_minutes" => self.session.duration_minutes.to_string(),
            "session.language" => self.session.language.clone(),
            _ => {
                return Err(MensetsuError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "unknown key".to_string(),
                });
            }
        };
        Ok(value)
    }

    /// Set a configuration value by dotted key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| MensetsuError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{value}'"),
                })
        }

        match key {
            "audio.device" => {
                self.audio.device = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "audio.sample_rate" => self.audio.sample_rate = parse(key, value)?,
            "detector.silence_threshold" => self.detector.silence_threshold = parse(key, value)?,
            "detector.silence_duration_ms" => {
                self.detector.silence_duration_ms = parse(key, value)?;
            }
            "detector.min_speak_ms" => self.detector.min_speak_ms = parse(key, value)?,
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.timeout_secs" => self.api.timeout_secs = parse(key, value)?,
            "session.duration_minutes" => self.session.duration_minutes = parse(key, value)?,
            "session.language" => self.session.language = value.to_string(),
            _ => {
                return Err(MensetsuError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "unknown key".to_string(),
                });
            }
        }
        Ok(())
    }

    /// All dotted keys recognized by [`Config::get`] / [`Config::set`].
    pub fn keys() -> &'static [&'static str] {
        &[
            "audio.device",
            "audio.sample_rate",
            "detector.silence_threshold",
            "detector.silence_duration_ms",
            "detector.min_speak_ms",
            "api.base_url",
            "api.timeout_secs",
            "session.duration_minutes",
            "session.language",
        ]
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/mensetsu/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mensetsu")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_mensetsu_env() {
        remove_env("MENSETSU_API_URL");
        remove_env("MENSETSU_AUDIO_DEVICE");
        remove_env("MENSETSU_LANGUAGE");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);

        assert_eq!(config.detector.silence_threshold, 12.0);
        assert_eq!(config.detector.silence_duration_ms, 2200);
        assert_eq!(config.detector.min_speak_ms, 1500);

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);

        assert_eq!(config.session.duration_minutes, 15);
        assert_eq!(config.session.language, "japanese");
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [audio]
            device = "hw:0,0"
            sample_rate = 48000

            [detector]
            silence_threshold = 20.0
            silence_duration_ms = 3000
            min_speak_ms = 1000

            [api]
            base_url = "https://coach.example.com"
            timeout_secs = 10

            [session]
            duration_minutes = 30
            language = "english"
        "#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.audio.device, Some("hw:0,0".to_string()));
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.detector.silence_threshold, 20.0);
        assert_eq!(config.detector.silence_duration_ms, 3000);
        assert_eq!(config.detector.min_speak_ms, 1000);
        assert_eq!(config.api.base_url, "https://coach.example.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.session.duration_minutes, 30);
        assert_eq!(config.session.language, "english");
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let toml_content = r#"
            [detector]
            silence_threshold = 8.0
        "#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.detector.silence_threshold, 8.0);
        // Everything else keeps defaults
        assert_eq!(config.detector.silence_duration_ms, 2200);
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(
            result,
            Err(MensetsuError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is [not valid toml").unwrap();

        let result = Config::load_or_default(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.base_url = "http://10.0.0.5:8000".to_string();
        config.session.duration_minutes = 20;
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_mensetsu_env();

        set_env("MENSETSU_API_URL", "http://192.168.1.10:8000");
        set_env("MENSETSU_AUDIO_DEVICE", "pipewire");
        set_env("MENSETSU_LANGUAGE", "english");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.api.base_url, "http://192.168.1.10:8000");
        assert_eq!(config.audio.device, Some("pipewire".to_string()));
        assert_eq!(config.session.language, "english");

        clear_mensetsu_env();
    }

    #[test]
    fn test_env_overrides_ignore_empty_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_mensetsu_env();

        set_env("MENSETSU_API_URL", "");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.api.base_url, "http://localhost:8000");

        clear_mensetsu_env();
    }

    #[test]
    fn test_get_known_keys() {
        let config = Config::default();
        assert_eq!(config.get("detector.silence_threshold").unwrap(), "12");
        assert_eq!(config.get("session.language").unwrap(), "japanese");
        assert_eq!(config.get("audio.device").unwrap(), "");
    }

    #[test]
    fn test_get_unknown_key_is_error() {
        let config = Config::default();
        assert!(matches!(
            config.get("stt.model"),
            Err(MensetsuError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn test_set_parses_values() {
        let mut config = Config::default();

        config.set("detector.silence_duration_ms", "1800").unwrap();
        assert_eq!(config.detector.silence_duration_ms, 1800);

        config.set("audio.device", "hw:1").unwrap();
        assert_eq!(config.audio.device, Some("hw:1".to_string()));

        config.set("audio.device", "").unwrap();
        assert_eq!(config.audio.device, None);
    }

    #[test]
    fn test_set_rejects_unparseable_values() {
        let mut config = Config::default();
        let result = config.set("session.duration_minutes", "fifteen");
        assert!(matches!(
            result,
            Err(MensetsuError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn test_every_listed_key_is_gettable() {
        let config = Config::default();
        for key in Config::keys() {
            assert!(config.get(key).is_ok(), "key {key} should be gettable");
        }
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = Config::default_path();
        assert!(path.ends_with("mensetsu/config.toml"));
    }
}
