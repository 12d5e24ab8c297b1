use std::sync::Arc;
use tracing::{error, info, warn};

use super::sanitize::ResponseSanitizer;
use super::session::ConversationSession;
use crate::config::{Config, ReplyConfig};
use crate::knowledge::KnowledgeBase;
use crate::llm::{ChatModel, QueryCategory};

/// Sends each classified query to its backend and owns the per-backend
/// conversation state.
///
/// Legal questions go to the knowledge service and keep a conversation
/// token across turns. General questions go to the cloud agent when one
/// is attached (with its own token), otherwise to the local model with no
/// memory between turns. Everything else gets a polite refusal without
/// touching the network.
///
/// Only the main loop calls into the router, one turn at a time; the
/// session token needs no lock under that discipline.
pub struct BackendRouter {
    chat: Arc<dyn ChatModel>,
    knowledge: Option<Arc<dyn KnowledgeBase>>,
    legal_session: ConversationSession,
    agent: Option<Arc<dyn KnowledgeBase>>,
    agent_session: ConversationSession,
    sanitizer: ResponseSanitizer,
    system_prompt: String,
    summary_chars: usize,
    replies: ReplyConfig,
}

impl BackendRouter {
    /// `knowledge` is `None` when the legal credential is missing
    pub fn new(
        chat: Arc<dyn ChatModel>,
        knowledge: Option<Arc<dyn KnowledgeBase>>,
        config: &Config,
    ) -> Self {
        if knowledge.is_none() {
            warn!("No legal knowledge backend, legal questions will be declined");
        }

        Self {
            chat,
            knowledge,
            legal_session: ConversationSession::new(),
            agent: None,
            agent_session: ConversationSession::new(),
            sanitizer: ResponseSanitizer::new(&config.sanitizer),
            system_prompt: config.llm.system_prompt.clone(),
            summary_chars: config.legal.summary_chars,
            replies: config.replies.clone(),
        }
    }

    /// Send general questions to a cloud agent instead of the local model
    pub fn with_agent(mut self, agent: Arc<dyn KnowledgeBase>) -> Self {
        info!("General questions go to the cloud agent");
        self.agent = Some(agent);
        self
    }

    /// Answer one query; the reply is already sanitized
    pub fn answer(&mut self, text: &str, category: QueryCategory) -> String {
        let raw = match category {
            QueryCategory::Legal => self.ask_legal(text),
            QueryCategory::General if self.agent.is_some() => self.ask_agent(text),
            QueryCategory::General => self.ask_general(text),
            QueryCategory::OtherProfessional => {
                info!("Declining {} question", category);
                self.replies.refusal.clone()
            }
        };

        self.sanitizer.sanitize(&raw)
    }

    /// Like [`answer`](Self::answer) but hands the reply to `deliver`
    /// instead of returning it. Empty replies are not delivered.
    pub fn answer_with<F>(&mut self, text: &str, category: QueryCategory, deliver: F)
    where
        F: FnOnce(String),
    {
        let reply = self.answer(text, category);
        if !reply.is_empty() {
            deliver(reply);
        }
    }

    pub fn legal_session(&self) -> &ConversationSession {
        &self.legal_session
    }

    /// Forget the legal conversation; the next legal turn starts a new one
    pub fn reset_legal_session(&mut self) {
        self.legal_session.reset();
    }

    pub fn agent_session(&self) -> &ConversationSession {
        &self.agent_session
    }

    /// Forget the cloud agent conversation
    pub fn reset_agent_session(&mut self) {
        self.agent_session.reset();
    }

    fn ask_legal(&mut self, text: &str) -> String {
        let Some(knowledge) = &self.knowledge else {
            return self.replies.legal_unconfigured.clone();
        };

        let query = format!(
            "{} Summarize the answer in about {} characters.",
            text, self.summary_chars
        );
        let token = self.legal_session.token().unwrap_or_default().to_string();

        match knowledge.ask(&query, &token) {
            Ok(reply) if !reply.answer.trim().is_empty() => {
                self.legal_session.accept(reply.conversation_id);
                reply.answer
            }
            Ok(_) => {
                error!("Knowledge backend returned an empty answer, resetting session");
                self.legal_session.reset();
                self.replies.legal_failure.clone()
            }
            Err(e) => {
                error!("Knowledge backend failed, resetting session: {}", e);
                self.legal_session.reset();
                self.replies.legal_failure.clone()
            }
        }
    }

    fn ask_agent(&mut self, text: &str) -> String {
        let Some(agent) = &self.agent else {
            return self.ask_general(text);
        };

        let token = self.agent_session.token().unwrap_or_default().to_string();

        match agent.ask(text, &token) {
            Ok(reply) if !reply.answer.trim().is_empty() => {
                self.agent_session.accept(reply.conversation_id);
                reply.answer
            }
            Ok(_) => {
                error!("Cloud agent returned an empty answer, resetting session");
                self.agent_session.reset();
                self.replies.general_unavailable.clone()
            }
            Err(e) if e.is_timeout() => {
                error!("Cloud agent timed out, resetting session: {}", e);
                self.agent_session.reset();
                self.replies.general_timeout.clone()
            }
            Err(e) => {
                error!("Cloud agent failed, resetting session: {}", e);
                self.agent_session.reset();
                self.replies.general_unavailable.clone()
            }
        }
    }

    fn ask_general(&self, text: &str) -> String {
        match self.chat.chat(&self.system_prompt, text) {
            Ok(reply) if !reply.is_empty() => reply,
            Ok(_) => {
                warn!("Local model returned an empty reply");
                self.replies.general_unavailable.clone()
            }
            Err(e) if e.is_timeout() => {
                error!("Local model timed out: {}", e);
                self.replies.general_timeout.clone()
            }
            Err(e) => {
                error!("Local model failed: {}", e);
                self.replies.general_unavailable.clone()
            }
        }
    }
}
