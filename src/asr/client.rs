use chrono::Utc;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Speech-recognition backend
pub trait SpeechRecognizer: Send {
    /// Send one WAV recording and return the decoded JSON payload as-is.
    ///
    /// Shape tolerance is the caller's job (see `extract`).
    fn recognize(&self, wav: &[u8], language: &str) -> Result<Value>;
}

/// Client for a SenseVoice FastAPI server (`POST /api/v1/asr`)
pub struct SenseVoiceClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl SenseVoiceClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SpeechRecognizer for SenseVoiceClient {
    fn recognize(&self, wav: &[u8], language: &str) -> Result<Value> {
        debug!(audio_bytes = wav.len(), language, "starting SenseVoice transcription");

        let file_name = format!("recording_{}.wav", Utc::now().timestamp());
        let part = Part::bytes(wav.to_vec())
            .file_name(file_name)
            .mime_str("audio/wav")?;

        // `keys` names each uploaded file in the response
        let form = Form::new()
            .part("files", part)
            .text("keys", "audio1")
            .text("lang", language.to_string());

        let response = self.client.post(&self.url).multipart(form).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!("SenseVoice returned {}: {}", status, body);
            return Err(Error::Transport(format!("SenseVoice error {status}")));
        }

        let payload: Value = response.json()?;
        debug!("SenseVoice raw payload: {}", payload);

        Ok(payload)
    }
}
