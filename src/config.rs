//! Configuration management for Sueo
//!
//! Provides persistent settings storage with schema versioning and migrations.
//! Configuration is stored in `~/.sueo/config.json` and cached in memory
//! after the first load.

use crate::recognition::dedup::DEFAULT_COOLDOWN_SECS;
use crate::recognition::sequence::{SequenceDefinition, DEFAULT_SEQUENCE_TIMEOUT_SECS};
use crate::recognition::vocabulary::DEFAULT_RESET_LABEL;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Current config schema version
pub const CURRENT_VERSION: u32 = 1;

/// Global config instance for caching
static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations
    pub version: u32,
    /// Gesture recognition settings
    pub recognition: RecognitionConfig,
    /// Sentence generation settings
    pub sentence: SentenceConfig,
    /// Text-to-speech and speech-to-text settings
    pub speech: SpeechConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            recognition: RecognitionConfig::default(),
            sentence: SentenceConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

/// Gesture recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Seconds before the same label is accepted again
    pub cooldown_secs: f64,
    /// Maximum seconds between steps of a sequence
    pub sequence_timeout_secs: f64,
    /// Minimum detector confidence (0.0 to 1.0)
    pub confidence_threshold: f32,
    /// Run the detector every N frames
    pub detection_interval: u32,
    /// Report sequence status every N frames
    pub status_interval: u32,
    /// Label that undoes the last recognised word
    pub reset_label: String,
    /// Multi-step gestures keyed by base name
    pub sequences: BTreeMap<String, SequenceDefinition>,
}

impl RecognitionConfig {
    /// Cooldown as a duration, falling back to the default if invalid
    pub fn cooldown(&self) -> Duration {
        positive_secs(self.cooldown_secs, DEFAULT_COOLDOWN_SECS, "cooldown_secs")
    }

    /// Sequence timeout as a duration, falling back to the default if invalid
    pub fn sequence_timeout(&self) -> Duration {
        positive_secs(
            self.sequence_timeout_secs,
            DEFAULT_SEQUENCE_TIMEOUT_SECS,
            "sequence_timeout_secs",
        )
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            sequence_timeout_secs: DEFAULT_SEQUENCE_TIMEOUT_SECS,
            confidence_threshold: 0.5,
            detection_interval: 30,
            status_interval: 10,
            reset_label: DEFAULT_RESET_LABEL.to_string(),
            sequences: default_sequences(),
        }
    }
}

/// Built-in multi-step gestures of the bundled detection model
pub fn default_sequences() -> BTreeMap<String, SequenceDefinition> {
    [
        ("구급차", 3),
        ("쓰러지다", 2),
        ("사람", 2),
    ]
    .into_iter()
    .map(|(name, steps)| (name.to_string(), SequenceDefinition::new(steps, name)))
    .collect()
}

/// Convert seconds to a duration, rejecting non-positive and non-finite values
pub(crate) fn positive_secs(secs: f64, fallback: f64, field: &str) -> Duration {
    if secs > 0.0 {
        if let Ok(duration) = Duration::try_from_secs_f64(secs) {
            return duration;
        }
    }
    tracing::warn!("Invalid {} ({}), using {}", field, secs, fallback);
    Duration::from_secs_f64(fallback)
}

/// Sentence generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceConfig {
    /// Base URL of the OpenAI-compatible API
    pub api_base_url: String,
    /// Chat model to use
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum tokens in the generated sentence
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether to reuse previously generated sentences
    pub use_cache: bool,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
            max_tokens: 100,
            temperature: 0.7,
            use_cache: true,
        }
    }
}

/// Speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Text-to-speech voice name
    pub voice: String,
    /// Speaking rate multiplier
    pub speaking_rate: f32,
    /// Voice pitch in semitones
    pub pitch: f32,
    /// Speech-to-text language code
    pub language_code: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: "ko-KR-Wavenet-A".to_string(),
            speaking_rate: 1.0,
            pitch: 0.0,
            language_code: "ko-KR".to_string(),
        }
    }
}

/// Get the path to the data directory (~/.sueo)
pub fn get_data_dir() -> PathBuf {
    home_dir_or_fallback().join(".sueo")
}

/// Get the path to the config file (~/.sueo/config.json)
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.json")
}

/// Get the home directory, falling back to /tmp if unavailable
fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("Could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    })
}

/// Load configuration from a file
///
/// A missing file yields the defaults. Older schema versions are migrated
/// and written back.
pub fn load_from_path(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        tracing::info!("Config file not found, using defaults");
        return Ok(Config::default());
    }

    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;

    let config: Config =
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse config: {}", e))?;

    let original_version = config.version;
    let migrated = migrate_config(config)?;

    if migrated.version != original_version {
        save_to_path(path, &migrated)?;
    }

    Ok(migrated)
}

/// Save configuration to a file, creating parent directories as needed
pub fn save_to_path(path: &Path, config: &Config) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialise config: {}", e))?;

    fs::write(path, contents).map_err(|e| format!("Failed to write config file: {}", e))?;

    tracing::info!("Config saved to {:?}", path);
    Ok(())
}

/// Migrate configuration from older schema versions
fn migrate_config(mut config: Config) -> Result<Config, String> {
    let original_version = config.version;

    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }

    if config.version != original_version {
        tracing::info!(
            "Migrated config from version {} to {}",
            original_version,
            config.version
        );
    }

    Ok(config)
}

/// Apply a single migration step
fn apply_migration(config: Config) -> Result<Config, String> {
    match config.version {
        // Version 0 -> 1: sequence definitions moved into the config file
        0 => {
            let mut migrated = config;
            if migrated.recognition.sequences.is_empty() {
                migrated.recognition.sequences = default_sequences();
            }
            migrated.version = 1;
            Ok(migrated)
        }
        v => Err(format!("Unknown config version: {}", v)),
    }
}

/// Get the global config instance
fn get_config_instance() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| {
        let config = load_from_path(&get_config_path()).unwrap_or_else(|e| {
            tracing::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        });
        tracing::info!(
            "Config loaded ({} sequence definitions)",
            config.recognition.sequences.len()
        );
        RwLock::new(config)
    })
}

/// Get the current configuration
///
/// The config is cached in memory and loaded from disk on first access.
pub fn get_config() -> Config {
    get_config_instance().read().clone()
}

/// Replace the configuration and persist it to disk
///
/// The version field is automatically updated to the current schema.
pub fn set_config(mut config: Config) -> Result<(), String> {
    config.version = CURRENT_VERSION;

    save_to_path(&get_config_path(), &config)?;

    let mut cached = get_config_instance().write();
    *cached = config;

    tracing::info!("Configuration updated");
    Ok(())
}

/// Reset configuration to defaults
///
/// Resets all settings to their default values and persists to disk.
pub fn reset_config() -> Result<Config, String> {
    let default_config = Config::default();

    save_to_path(&get_config_path(), &default_config)?;

    let mut cached = get_config_instance().write();
    *cached = default_config.clone();

    tracing::info!("Configuration reset to defaults");
    Ok(default_config)
}
