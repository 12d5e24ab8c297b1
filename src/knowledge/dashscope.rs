use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::dify::{KnowledgeBase, KnowledgeReply};
use crate::config::AgentConfig;
use crate::error::{Error, Result};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    input: CompletionInput<'a>,
    parameters: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct CompletionInput<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    session_id: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    output: Option<CompletionOutput>,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Deserialize)]
struct CompletionOutput {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Cloud conversational agent (DashScope application completion API)
///
/// Multi-turn memory lives on the server and is keyed by the
/// `session_id` returned with every answer.
pub struct DashScopeAgent {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl DashScopeAgent {
    /// Fails with `Error::Configuration` when the key or application id is blank
    pub fn new(config: &AgentConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "{} is not set, cloud agent disabled",
                config.api_key_env
            )));
        }
        if config.app_id.trim().is_empty() {
            return Err(Error::Configuration(
                "agent.app_id is not set, cloud agent disabled".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        info!("Cloud agent: {}", config.url());

        Ok(Self {
            client,
            url: config.url(),
            api_key,
        })
    }
}

impl KnowledgeBase for DashScopeAgent {
    fn ask(&self, query: &str, conversation_id: &str) -> Result<KnowledgeReply> {
        let request = CompletionRequest {
            input: CompletionInput {
                prompt: query,
                session_id: conversation_id,
            },
            parameters: serde_json::Map::new(),
        };

        debug!(session = conversation_id, "sending prompt to cloud agent");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().unwrap_or_default();
            error!(
                "Cloud agent returned {}: {} {}",
                status,
                body.code.unwrap_or_default(),
                body.message.unwrap_or_default()
            );
            return Err(Error::Transport(format!("cloud agent error {status}")));
        }

        let result: CompletionResponse = response.json()?;
        let output = result.output.ok_or_else(|| {
            Error::MalformedResponse(format!(
                "cloud agent reply without output (request {})",
                result.request_id.unwrap_or_default()
            ))
        })?;

        Ok(KnowledgeReply {
            answer: output.text.unwrap_or_default(),
            conversation_id: output.session_id.filter(|id| !id.is_empty()),
        })
    }
}
