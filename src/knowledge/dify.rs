use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::LegalConfig;
use crate::error::{Error, Result};

/// Answer from a conversational knowledge service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeReply {
    pub answer: String,
    /// Token to send with the next turn of the same conversation
    pub conversation_id: Option<String>,
}

/// Retrieval-augmented conversational backend
pub trait KnowledgeBase: Send + Sync {
    /// Ask one question. `conversation_id` is "" for a new conversation.
    fn ask(&self, query: &str, conversation_id: &str) -> Result<KnowledgeReply>;
}

#[derive(Serialize)]
struct ChatMessageRequest<'a> {
    inputs: serde_json::Map<String, serde_json::Value>,
    query: &'a str,
    response_mode: &'a str,
    conversation_id: &'a str,
    user: &'a str,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
}

/// Dify chat application (`POST /v1/chat-messages`, blocking mode)
pub struct DifyClient {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    response_mode: String,
    user_id: String,
}

impl DifyClient {
    /// Fails with `Error::Configuration` when the API key is blank
    pub fn new(config: &LegalConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "{} is not set, legal questions are disabled",
                config.api_key_env
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        info!("Legal knowledge backend: {}", config.url());

        Ok(Self {
            client,
            url: config.url(),
            api_key,
            response_mode: config.response_mode.clone(),
            user_id: config.user_id.clone(),
        })
    }
}

impl KnowledgeBase for DifyClient {
    fn ask(&self, query: &str, conversation_id: &str) -> Result<KnowledgeReply> {
        let request = ChatMessageRequest {
            inputs: serde_json::Map::new(),
            query,
            response_mode: &self.response_mode,
            conversation_id,
            user: &self.user_id,
        };

        debug!(
            conversation = conversation_id,
            "sending query to knowledge backend"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!("Knowledge backend returned {}: {}", status, body);
            return Err(Error::Transport(format!("knowledge backend error {status}")));
        }

        let result: ChatMessageResponse = response.json()?;

        let answer = result
            .answer
            .filter(|a| !a.trim().is_empty())
            .or(result.text)
            .unwrap_or_default();

        Ok(KnowledgeReply {
            answer,
            conversation_id: result.conversation_id.filter(|id| !id.is_empty()),
        })
    }
}
