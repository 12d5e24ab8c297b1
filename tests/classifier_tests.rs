// Integration tests for query classification
//
// These tests verify label priority, case handling and that every failure
// falls back to the General category.

mod common;

use common::{ChatScript, FakeChat};
use ptt_assistant::config::ClassifierConfig;
use ptt_assistant::llm::{QueryCategory, QueryClassifier};
use std::sync::Arc;

fn classifier_with(script: Vec<ChatScript>) -> (QueryClassifier, Arc<FakeChat>) {
    let model = Arc::new(FakeChat::scripted(script, "General"));
    let classifier = QueryClassifier::new(model.clone(), &ClassifierConfig::default());
    (classifier, model)
}

fn reply(text: &str) -> ChatScript {
    ChatScript::Reply(text.to_string())
}

#[test]
fn test_single_labels() {
    let (classifier, _) = classifier_with(vec![
        reply("Legal"),
        reply("General"),
        reply("OtherProfessional"),
    ]);

    assert_eq!(classifier.classify("q1"), QueryCategory::Legal);
    assert_eq!(classifier.classify("q2"), QueryCategory::General);
    assert_eq!(classifier.classify("q3"), QueryCategory::OtherProfessional);
}

#[test]
fn test_legal_wins_over_other_labels() {
    let (classifier, _) = classifier_with(vec![
        reply("General, or maybe Legal"),
        reply("OtherProfessional / Legal"),
    ]);

    assert_eq!(classifier.classify("q"), QueryCategory::Legal);
    assert_eq!(classifier.classify("q"), QueryCategory::Legal);
}

#[test]
fn test_general_wins_over_other_professional() {
    let (classifier, _) = classifier_with(vec![reply("OtherProfessional or General")]);
    assert_eq!(classifier.classify("q"), QueryCategory::General);
}

#[test]
fn test_labels_match_case_insensitively() {
    let (classifier, _) = classifier_with(vec![reply("category: legal.")]);
    assert_eq!(classifier.classify("q"), QueryCategory::Legal);
}

#[test]
fn test_unknown_reply_defaults_to_general() {
    let (classifier, _) = classifier_with(vec![reply("I am not sure"), reply("")]);

    assert_eq!(classifier.classify("q"), QueryCategory::General);
    assert_eq!(classifier.classify("q"), QueryCategory::General);
}

#[test]
fn test_timeout_defaults_to_general() {
    let (classifier, model) = classifier_with(vec![ChatScript::Timeout]);

    assert_eq!(classifier.classify("can I break my lease"), QueryCategory::General);
    assert_eq!(model.call_count(), 1);
}

#[test]
fn test_transport_failure_defaults_to_general() {
    let (classifier, _) = classifier_with(vec![ChatScript::Fail]);
    assert_eq!(classifier.classify("q"), QueryCategory::General);
}

#[test]
fn test_classifier_sends_prompt_and_query() {
    let (classifier, model) = classifier_with(vec![reply("General")]);

    classifier.classify("how tall is the tower");

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ClassifierConfig::default().prompt);
    assert_eq!(calls[0].1, "how tall is the tower");
}

#[test]
fn test_custom_labels() {
    let config = ClassifierConfig {
        legal_label: "LAW".to_string(),
        general_label: "CHAT".to_string(),
        other_label: "EXPERT".to_string(),
        ..ClassifierConfig::default()
    };
    let classifier = QueryClassifier::new(Arc::new(FakeChat::replying("")), &config);

    assert_eq!(classifier.match_label("law"), Some(QueryCategory::Legal));
    assert_eq!(classifier.match_label("Expert"), Some(QueryCategory::OtherProfessional));
    assert_eq!(classifier.match_label("Legal"), None);
}

#[test]
fn test_category_display_names() {
    assert_eq!(QueryCategory::Legal.to_string(), "legal");
    assert_eq!(QueryCategory::General.to_string(), "general");
    assert_eq!(QueryCategory::OtherProfessional.to_string(), "other-professional");
}
