use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub chunking: ChunkingConfig,
    pub recognition: RecognitionConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub fragment_cadence_ms: u64,
}

/// Chunk sealing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Fragments per chunk (size policy)
    pub fragments: usize,
    /// Wall-clock rollover interval in seconds (time policy)
    pub rollover_secs: u64,
}

/// Recognition service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognitionConfig {
    pub endpoint: String,
    pub language: String,
    pub api_token: Option<String>,
    /// Transcription allowance in seconds; None means unlimited
    pub allowance_secs: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            fragment_cadence_ms: defaults::FRAGMENT_CADENCE_MS,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            fragments: defaults::CHUNK_FRAGMENTS,
            rollover_secs: defaults::ROLLOVER_INTERVAL.as_secs(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            api_token: None,
            allowance_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MEETSCRIBE_LANGUAGE → recognition.language
    /// - MEETSCRIBE_ENDPOINT → recognition.endpoint
    /// - MEETSCRIBE_API_TOKEN → recognition.api_token
    /// - MEETSCRIBE_AUDIO_DEVICE → capture.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("MEETSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.recognition.language = language;
        }

        if let Ok(endpoint) = std::env::var("MEETSCRIBE_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.recognition.endpoint = endpoint;
        }

        if let Ok(token) = std::env::var("MEETSCRIBE_API_TOKEN")
            && !token.is_empty()
        {
            self.recognition.api_token = Some(token);
        }

        if let Ok(device) = std::env::var("MEETSCRIBE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.capture.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/meetscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetscribe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.capture.sample_rate, 16000);
        assert_eq!(config.capture.fragment_cadence_ms, 1000);
        assert!(config.capture.device.is_none());
        assert_eq!(config.chunking.fragments, 5);
        assert_eq!(config.chunking.rollover_secs, 1800);
        assert_eq!(config.recognition.language, "en-US");
        assert!(config.recognition.endpoint.is_empty());
        assert!(config.recognition.api_token.is_none());
        assert!(config.recognition.allowance_secs.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[capture]
device = "pipewire"
sample_rate = 16000
fragment_cadence_ms = 500

[chunking]
fragments = 10
rollover_secs = 600

[recognition]
endpoint = "https://speech.example.com/recognize"
language = "de-DE"
api_token = "secret"
allowance_secs = 3600
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.capture.device, Some("pipewire".to_string()));
        assert_eq!(config.capture.fragment_cadence_ms, 500);
        assert_eq!(config.chunking.fragments, 10);
        assert_eq!(config.chunking.rollover_secs, 600);
        assert_eq!(
            config.recognition.endpoint,
            "https://speech.example.com/recognize"
        );
        assert_eq!(config.recognition.language, "de-DE");
        assert_eq!(config.recognition.api_token, Some("secret".to_string()));
        assert_eq!(config.recognition.allowance_secs, Some(3600));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[recognition]
language = "fr-FR"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.recognition.language, "fr-FR");
        assert_eq!(config.chunking.fragments, 5);
        assert_eq!(config.capture.sample_rate, 16000);
    }

    #[test]
    fn test_load_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not = valid = toml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist.toml");

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_propagates_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[broken").unwrap();

        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let mut config = Config::default();
        config.recognition.endpoint = "https://example.com".to_string();
        config.chunking.fragments = 7;

        let toml_str = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = Config::default_path();
        assert!(path.ends_with("meetscribe/config.toml"));
    }
}
