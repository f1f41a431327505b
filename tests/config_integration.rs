//! Configuration system integration tests for Sueo.
//!
//! Tests the load, save, and migration behaviour of the configuration
//! system using temporary files to avoid affecting the real config.

use std::fs;
use std::time::Duration;
use sueo_lib::config::{self, Config, CURRENT_VERSION};
use sueo_lib::recognition::SequenceDefinition;
use tempfile::TempDir;

#[test]
fn test_default_config_has_current_version() {
    let config = Config::default();
    assert_eq!(config.version, CURRENT_VERSION);
}

#[test]
fn test_recognition_config_defaults() {
    let recognition = Config::default().recognition;
    assert_eq!(recognition.cooldown(), Duration::from_secs(3));
    assert_eq!(recognition.sequence_timeout(), Duration::from_secs(10));
    assert_eq!(recognition.reset_label, "리셋");
    assert_eq!(recognition.detection_interval, 30);
    assert_eq!(
        recognition.sequences.get("구급차"),
        Some(&SequenceDefinition::new(3, "구급차"))
    );
}

#[test]
fn test_sentence_and_speech_defaults() {
    let config = Config::default();
    assert_eq!(config.sentence.model, "gpt-3.5-turbo");
    assert_eq!(config.sentence.api_key_env, "OPENAI_API_KEY");
    assert!(config.sentence.use_cache);
    assert_eq!(config.speech.language_code, "ko-KR");
}

#[test]
fn test_save_and_load_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.recognition.cooldown_secs = 1.5;
    config.recognition.reset_label = "처음부터".to_string();
    config.sentence.model = "gpt-4o-mini".to_string();
    config
        .recognition
        .sequences
        .insert("학교".to_string(), SequenceDefinition::new(2, "학교"));

    config::save_to_path(&path, &config).unwrap();
    let loaded = config::load_from_path(&path).unwrap();

    assert_eq!(loaded.recognition.cooldown(), Duration::from_millis(1500));
    assert_eq!(loaded.recognition.reset_label, "처음부터");
    assert_eq!(loaded.sentence.model, "gpt-4o-mini");
    assert_eq!(loaded.recognition.sequences.len(), 4);
}

#[test]
fn test_load_nonexistent_config_returns_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.json");

    let config = config::load_from_path(&path).unwrap();
    assert_eq!(config.version, CURRENT_VERSION);
    assert!(!path.exists());
}

#[test]
fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("config.json");

    config::save_to_path(&path, &Config::default()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_partial_config_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"version": 1, "recognition": {"cooldown_secs": 2.0}}"#,
    )
    .unwrap();

    let config = config::load_from_path(&path).unwrap();
    assert_eq!(config.recognition.cooldown(), Duration::from_secs(2));
    assert_eq!(config.recognition.sequence_timeout(), Duration::from_secs(10));
    assert_eq!(config.speech.voice, "ko-KR-Wavenet-A");
}

#[test]
fn test_old_version_config_is_migrated_and_saved() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"version": 0, "recognition": {"sequences": {}}}"#,
    )
    .unwrap();

    let config = config::load_from_path(&path).unwrap();
    assert_eq!(config.version, CURRENT_VERSION);
    assert_eq!(config.recognition.sequences.len(), 3);

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["version"], CURRENT_VERSION);
}

#[test]
fn test_newer_version_loads_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"version": 99}"#).unwrap();

    let config = config::load_from_path(&path).unwrap();
    assert_eq!(config.version, 99);
}

#[test]
fn test_invalid_durations_fall_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"recognition": {"cooldown_secs": -1.0, "sequence_timeout_secs": 0.0}}"#,
    )
    .unwrap();

    let config = config::load_from_path(&path).unwrap();
    assert_eq!(config.recognition.cooldown(), Duration::from_secs(3));
    assert_eq!(config.recognition.sequence_timeout(), Duration::from_secs(10));
}

#[test]
fn test_config_handles_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let err = config::load_from_path(&path).unwrap_err();
    assert!(err.contains("Failed to parse config"));
}

#[test]
fn test_config_with_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"version": 1, "camera": {"index": 2}, "speech": {"pitch": 2.5}}"#,
    )
    .unwrap();

    let config = config::load_from_path(&path).unwrap();
    assert_eq!(config.speech.pitch, 2.5);
}

#[test]
fn test_multiple_saves_dont_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    for i in 1..=5u32 {
        let mut config = Config::default();
        config.recognition.status_interval = i;
        config::save_to_path(&path, &config).unwrap();
    }

    let loaded = config::load_from_path(&path).unwrap();
    assert_eq!(loaded.recognition.status_interval, 5);
}
