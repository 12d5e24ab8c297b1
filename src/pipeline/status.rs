use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::recording::RecordingState;

/// Recognized text of one turn
#[derive(Debug, Clone, Serialize)]
pub struct Utterance {
    /// Correlates the log lines of one turn
    pub id: Uuid,

    pub text: String,

    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Snapshot of the pipeline, published by the main loop
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    /// Current push-to-talk state
    pub state: RecordingState,

    /// When the pipeline was created
    pub started_at: DateTime<Utc>,

    /// Turns that reached a backend
    pub turns: usize,

    /// Replies dropped because the speech queue was full
    pub tts_dropped: usize,

    /// Whether a legal conversation is in progress
    pub legal_session_live: bool,

    /// Whether a cloud agent conversation is in progress
    pub agent_session_live: bool,

    /// Most recent recognized utterance
    pub last_utterance: Option<Utterance>,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self {
            state: RecordingState::Idle,
            started_at: Utc::now(),
            turns: 0,
            tts_dropped: 0,
            legal_session_live: false,
            agent_session_live: false,
            last_utterance: None,
        }
    }
}

/// Status shared between the main loop (writer) and the HTTP API (readers)
///
/// Both sides hold the lock only long enough to copy or patch the
/// snapshot, so a plain blocking lock is safe to take from sync and async
/// code alike.
#[derive(Debug, Clone, Default)]
pub struct SharedStatus(Arc<RwLock<PipelineStatus>>);

impl SharedStatus {
    /// Copy of the latest snapshot
    pub fn snapshot(&self) -> PipelineStatus {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Patch the snapshot in place
    pub fn update(&self, apply: impl FnOnce(&mut PipelineStatus)) {
        let mut status = self.0.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut status);
    }
}
