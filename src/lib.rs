pub mod asr;
pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod knowledge;
pub mod llm;
pub mod pipeline;
pub mod preflight;
pub mod recording;
pub mod router;
pub mod tts;
pub mod wake;

pub use asr::{SenseVoiceClient, SpeechRecognizer, TranscriptionGateway};
pub use audio::{AudioBuffer, AudioFormat, AudioSource, RecordingArchive, SilenceSource, WavFileSource};
pub use config::Config;
pub use error::{Error, Result};
pub use http::{create_router, AppState};
pub use knowledge::{DashScopeAgent, DifyClient, KnowledgeBase, KnowledgeReply};
pub use llm::{ChatModel, OllamaClient, QueryCategory, QueryClassifier};
pub use pipeline::{ControlEvent, ControlSource, Pipeline, PipelineBackends, PipelineStatus, TurnOutcome};
pub use preflight::PreflightReport;
pub use recording::{RecordingState, RecordingStateMachine, Toggle};
pub use router::{BackendRouter, ConversationSession, ResponseSanitizer};
pub use tts::{DisplayRole, DisplaySink, EnqueueOutcome, SpeechEngine, TtsDispatcher};
pub use wake::WakeFilter;
