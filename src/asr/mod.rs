//! Speech recognition
//!
//! `TranscriptionGateway` wraps a `SpeechRecognizer` backend with the
//! minimum-duration check, WAV encoding and tolerant payload parsing.

mod client;
pub mod extract;
mod gateway;

pub use client::{SenseVoiceClient, SpeechRecognizer};
pub use extract::extract_text;
pub use gateway::TranscriptionGateway;
