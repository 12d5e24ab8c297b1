//! Wake phrase filtering
//!
//! Push-to-talk already tells us the user meant to talk, but short
//! fragments ("uh", a cough) still come back from the recognizer. Those are
//! dropped unless they contain a wake phrase.

use crate::config::WakeConfig;

/// Decides whether recognized text goes on to the assistant
#[derive(Debug, Clone)]
pub struct WakeFilter {
    phrases: Vec<String>,
    min_text_chars: usize,
    min_non_wake_chars: usize,
}

impl WakeFilter {
    pub fn new(config: &WakeConfig) -> Self {
        let phrases: Vec<String> = config
            .phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        tracing::debug!(wake_phrases = ?phrases, "wake filter initialized");

        Self {
            phrases,
            min_text_chars: config.min_text_chars,
            min_non_wake_chars: config.min_non_wake_chars,
        }
    }

    /// Text long enough to be a real utterance at all
    pub fn is_speech(&self, text: &str) -> bool {
        let chars = text.chars().count();
        chars > 0 && chars >= self.min_text_chars
    }

    /// Any wake phrase present (case-insensitive)
    pub fn has_wake_phrase(&self, text: &str) -> bool {
        let normalized = text.to_lowercase();
        self.phrases
            .iter()
            .any(|phrase| normalized.contains(phrase.as_str()))
    }

    /// Wake phrase present, or the text is longer than the non-wake minimum
    pub fn should_process(&self, text: &str) -> bool {
        if self.has_wake_phrase(text) {
            tracing::info!(text, "wake phrase detected");
            return true;
        }
        text.chars().count() > self.min_non_wake_chars
    }
}
