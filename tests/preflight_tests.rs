// Unit tests for the startup checks
//
// These tests verify the readiness decision and the helpers that interpret
// service URLs and model listings. No network access is needed.

use anyhow::Result;
use ptt_assistant::preflight::{self, PreflightReport};
use serde_json::json;

fn ready_report() -> PreflightReport {
    PreflightReport {
        asr_reachable: true,
        asr_detail: "HTTP 200".to_string(),
        llm_reachable: true,
        models: vec!["qwen2.5:1.5b".to_string()],
        model_available: true,
        legal_configured: true,
        agent_configured: false,
    }
}

#[test]
fn test_ready_when_asr_and_model_available() {
    assert!(ready_report().is_ready());
}

#[test]
fn test_missing_legal_credential_is_not_fatal() {
    let report = PreflightReport {
        legal_configured: false,
        ..ready_report()
    };
    assert!(report.is_ready());
}

#[test]
fn test_other_model_is_enough() {
    let report = PreflightReport {
        models: vec!["llama3:8b".to_string()],
        model_available: false,
        ..ready_report()
    };
    assert!(report.is_ready());
}

#[test]
fn test_not_ready_without_asr() {
    let report = PreflightReport {
        asr_reachable: false,
        ..ready_report()
    };
    assert!(!report.is_ready());
}

#[test]
fn test_not_ready_without_models() {
    let report = PreflightReport {
        models: Vec::new(),
        model_available: false,
        ..ready_report()
    };
    assert!(!report.is_ready());

    let report = PreflightReport {
        llm_reachable: false,
        ..ready_report()
    };
    assert!(!report.is_ready());

    assert!(!PreflightReport::default().is_ready());
}

#[test]
fn test_service_root_strips_path() -> Result<()> {
    assert_eq!(
        preflight::service_root("http://127.0.0.1:7860/api/v1/asr")?.as_str(),
        "http://127.0.0.1:7860/"
    );
    assert_eq!(
        preflight::service_root("https://asr.example.com")?.as_str(),
        "https://asr.example.com/"
    );
    assert!(preflight::service_root("not a url").is_err());

    Ok(())
}

#[test]
fn test_model_names_from_tags_payload() {
    let payload = json!({
        "models": [
            {"name": "qwen2.5:1.5b", "size": 986061892},
            {"name": "llama3:8b"},
            {"size": 1}
        ]
    });
    assert_eq!(preflight::model_names(&payload), vec!["qwen2.5:1.5b", "llama3:8b"]);

    assert!(preflight::model_names(&json!({"models": []})).is_empty());
    assert!(preflight::model_names(&json!({"error": "boom"})).is_empty());
}
