use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{Error, Result};

/// A chat-completion model taking one system and one user message
pub trait ChatModel: Send + Sync {
    /// Non-streaming completion; returns the trimmed reply text
    fn chat(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from Ollama `/api/chat` with `stream: false`
#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Local Ollama server
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::Configuration("no local model configured".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatModel for OllamaClient {
    fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };

        debug!(model = %self.model, chars = user.chars().count(), "sending chat request");

        let response = self.client.post(&self.url).json(&request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!("Ollama returned {}: {}", status, body);
            return Err(Error::Transport(format!("Ollama error {status}")));
        }

        let result: ChatResponse = response.json()?;
        Ok(result.message.content.trim().to_string())
    }
}
