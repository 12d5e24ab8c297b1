//! Local language model: query classification and general answers

mod classifier;
mod ollama;

pub use classifier::{QueryCategory, QueryClassifier};
pub use ollama::{ChatModel, OllamaClient};
