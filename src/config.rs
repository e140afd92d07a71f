//! Configuration for the contextual-action engine and its host.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credentials::CredentialRef;
use crate::error::{Result, ScreenwiseError};

/// Top-level configuration, stored as `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenwiseConfig {
    /// Generative text backend settings.
    pub ai: AiConfig,
    /// Speech input settings.
    pub speech: SpeechConfig,
    /// State store settings.
    pub store: StoreConfig,
    /// Log output settings (host binary only).
    pub logging: LoggingConfig,
}

/// Generative text backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
    /// API key reference. Empty falls back to `GEMINI_API_KEY`.
    pub api_key: CredentialRef,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_owned(),
            model: "gemini-2.0-flash".to_owned(),
            temperature: 0.4,
            max_output_tokens: 1024,
            api_key: CredentialRef::None,
        }
    }
}

/// Speech input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// BCP-47 language hint passed to the recognizer.
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_owned(),
        }
    }
}

/// State store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Overlay starts expanded.
    pub start_expanded: bool,
    /// Side-effect broadcast buffer. Slow subscribers past this lag and
    /// lose the oldest effects.
    pub effect_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            start_expanded: true,
            effect_capacity: 64,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write a daily rolling log file under the logs directory.
    pub file_logging: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_logging: false,
            default_filter: "info".to_owned(),
        }
    }
}

impl ScreenwiseConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ScreenwiseError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScreenwiseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_file()
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenwiseError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.ai.model.trim().is_empty() {
            return Err(ScreenwiseError::Config("ai.model must not be empty".into()));
        }
        if !(self.ai.base_url.starts_with("http://") || self.ai.base_url.starts_with("https://"))
        {
            return Err(ScreenwiseError::Config(format!(
                "ai.base_url must be an http(s) URL, got {:?}",
                self.ai.base_url
            )));
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ScreenwiseError::Config(format!(
                "ai.temperature must be within 0.0..=2.0, got {}",
                self.ai.temperature
            )));
        }
        if self.store.effect_capacity == 0 {
            return Err(ScreenwiseError::Config(
                "store.effect_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
