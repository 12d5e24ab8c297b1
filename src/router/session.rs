use tracing::{debug, info};

/// The live conversation with one backend
///
/// Holds at most one opaque token. Only that backend's successful reply
/// writes it; any failure clears it so the next turn starts fresh.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    token: Option<String>,
    turns: usize,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_live(&self) -> bool {
        self.token.is_some()
    }

    /// Successful turns since the last reset
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Record a successful reply. A reply without a token keeps the current one.
    pub fn accept(&mut self, token: Option<String>) {
        self.turns += 1;
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            if self.token.as_deref() != Some(token.as_str()) {
                debug!("Conversation token updated: {}", token);
            }
            self.token = Some(token);
        }
    }

    pub fn reset(&mut self) {
        if self.token.take().is_some() {
            info!("Conversation session reset after {} turns", self.turns);
        }
        self.turns = 0;
    }
}
