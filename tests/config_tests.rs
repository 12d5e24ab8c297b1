// Integration tests for configuration loading
//
// These tests verify defaults, TOML overrides and environment overrides.

use anyhow::Result;
use ptt_assistant::config::{AgentConfig, Config, LegalConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_match_device_setup() {
    let config = Config::default();

    assert_eq!(config.audio.sample_rate, 16000);
    assert_eq!(config.audio.channels, 1);
    assert_eq!(config.audio.frames_per_buffer, 4000);
    assert_eq!(config.asr.url, "http://127.0.0.1:7860/api/v1/asr");
    assert!((config.asr.min_duration_secs - 0.3).abs() < f64::EPSILON);
    assert_eq!(config.llm.tags_url, "http://127.0.0.1:11434/api/tags");
    assert_eq!(config.legal.url(), "http://localhost/v1/chat-messages");
    assert_eq!(config.legal.api_key_env, "DIFY_API_KEY");
    assert_eq!(config.sanitizer.default_mark, '。');
    assert!(config.http.bind.is_none());
}

#[test]
fn test_missing_file_falls_back_to_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("does-not-exist");

    let config = Config::load(&path.to_string_lossy())?;
    assert_eq!(config.asr.language, "auto");

    Ok(())
}

#[test]
fn test_toml_overrides_selected_fields() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("assistant.toml");
    fs::write(
        &path,
        r#"
[asr]
url = "http://10.0.0.5:7860/api/v1/asr"
min_duration_secs = 0.5
archive_dir = "/tmp/recordings"

[wake]
phrases = ["computer"]

[legal]
base_url = "http://dify.local/"
summary_chars = 80

[http]
bind = "127.0.0.1:8088"
"#,
    )?;

    let config = Config::load(&path.to_string_lossy())?;

    assert_eq!(config.asr.url, "http://10.0.0.5:7860/api/v1/asr");
    assert!((config.asr.min_duration_secs - 0.5).abs() < f64::EPSILON);
    assert_eq!(
        config.asr.archive_dir.as_deref(),
        Some(std::path::Path::new("/tmp/recordings"))
    );
    assert_eq!(config.wake.phrases, vec!["computer"]);
    assert_eq!(config.wake.min_non_wake_chars, 2, "unset fields keep defaults");
    assert_eq!(config.legal.url(), "http://dify.local/v1/chat-messages");
    assert_eq!(config.legal.summary_chars, 80);
    assert_eq!(config.http.bind.as_deref(), Some("127.0.0.1:8088"));

    Ok(())
}

#[test]
fn test_environment_overrides_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("assistant.toml");
    fs::write(&path, "[tts]\ncommand = \"espeak\"\nqueue_capacity = 5\n")?;

    std::env::set_var("PTT_TTS__QUEUE_CAPACITY", "3");
    let config = Config::load(&path.to_string_lossy());
    std::env::remove_var("PTT_TTS__QUEUE_CAPACITY");
    let config = config?;

    assert_eq!(config.tts.queue_capacity, 3);
    assert_eq!(config.tts.command, "espeak");

    Ok(())
}

#[test]
fn test_legal_key_read_from_named_variable() {
    let legal = LegalConfig {
        api_key_env: "CONFIG_TEST_LEGAL_KEY".to_string(),
        ..LegalConfig::default()
    };

    std::env::remove_var("CONFIG_TEST_LEGAL_KEY");
    assert_eq!(legal.api_key(), None);

    std::env::set_var("CONFIG_TEST_LEGAL_KEY", "   ");
    assert_eq!(legal.api_key(), None, "blank key counts as missing");

    std::env::set_var("CONFIG_TEST_LEGAL_KEY", " app-123 ");
    assert_eq!(legal.api_key().as_deref(), Some("app-123"));

    std::env::remove_var("CONFIG_TEST_LEGAL_KEY");
}

#[test]
fn test_agent_needs_app_id_and_key() {
    let mut agent = AgentConfig {
        api_key_env: "CONFIG_TEST_AGENT_KEY".to_string(),
        ..AgentConfig::default()
    };

    std::env::set_var("CONFIG_TEST_AGENT_KEY", "sk-123");
    assert!(!agent.is_configured(), "no application id yet");

    agent.app_id = "app-9".to_string();
    assert!(agent.is_configured());

    std::env::remove_var("CONFIG_TEST_AGENT_KEY");
    assert!(!agent.is_configured());
}

#[test]
fn test_timeouts_convert_to_durations() {
    let config = Config::default();

    assert_eq!(config.asr.timeout().as_secs(), config.asr.timeout_secs);
    assert_eq!(config.llm.timeout().as_secs(), config.llm.timeout_secs);
    assert_eq!(
        config.tts.enqueue_timeout().as_millis() as u64,
        config.tts.enqueue_timeout_ms
    );
}
