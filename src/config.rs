use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::audio::AudioFormat;

/// Assistant configuration.
///
/// Every section has defaults, so the TOML file is optional. Environment
/// variables override file values: `PTT_ASR__URL`, `PTT_LLM__MODEL`, ...
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub asr: AsrConfig,
    pub llm: LlmConfig,
    pub classifier: ClassifierConfig,
    pub legal: LegalConfig,
    pub agent: AgentConfig,
    pub wake: WakeConfig,
    pub sanitizer: SanitizerConfig,
    pub tts: TtsConfig,
    pub replies: ReplyConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Frames requested from the capture source per loop iteration
    pub frames_per_buffer: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            frames_per_buffer: 4000,
        }
    }
}

impl AudioConfig {
    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, self.channels)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AsrConfig {
    /// SenseVoice FastAPI endpoint
    pub url: String,
    /// Language hint: auto, zh, en, yue, ja, ko
    pub language: String,
    pub timeout_secs: u64,
    /// Recordings shorter than this are never sent
    pub min_duration_secs: f64,
    /// Keep a WAV copy of every transcribed recording here
    pub archive_dir: Option<PathBuf>,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7860/api/v1/asr".to_string(),
            language: "auto".to_string(),
            timeout_secs: 30,
            min_duration_secs: 0.3,
            archive_dir: None,
        }
    }
}

impl AsrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama chat endpoint
    pub url: String,
    /// Ollama model listing, used by the startup probe
    pub tags_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// Persona for general questions
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:11434/api/chat".to_string(),
            tags_url: "http://127.0.0.1:11434/api/tags".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            timeout_secs: 15,
            probe_timeout_secs: 5,
            system_prompt: "You are Q, an offline voice assistant running on a small device. \
                            Understand the question and give a helpful answer instead of repeating it. \
                            Ask for clarification if the question is unclear. \
                            Keep answers short, one or two sentences."
                .to_string(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub prompt: String,
    pub legal_label: String,
    pub general_label: String,
    pub other_label: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            prompt: "Classify the user's question into exactly one category and reply with the \
                     category name only.\n\
                     Legal: legal cases, disputes, rights, contracts, laws and regulations.\n\
                     General: everyday questions, chit-chat, weather, time, general knowledge.\n\
                     OtherProfessional: medicine, finance, engineering or other specialist fields."
                .to_string(),
            legal_label: "Legal".to_string(),
            general_label: "General".to_string(),
            other_label: "OtherProfessional".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LegalConfig {
    pub base_url: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub response_mode: String,
    pub user_id: String,
    pub timeout_secs: u64,
    /// Target answer length appended to every query
    pub summary_chars: usize,
}

impl Default for LegalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            endpoint: "/v1/chat-messages".to_string(),
            api_key_env: "DIFY_API_KEY".to_string(),
            response_mode: "blocking".to_string(),
            user_id: "ptt-device".to_string(),
            timeout_secs: 30,
            summary_chars: 50,
        }
    }
}

impl LegalConfig {
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.endpoint)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credential from the environment; `None` when unset or blank
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Cloud conversational agent for general questions.
///
/// Used instead of the local model once both the application id and the
/// credential are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub base_url: String,
    /// Application id from the DashScope console; empty disables the agent
    pub app_id: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dashscope.aliyuncs.com".to_string(),
            app_id: String::new(),
            api_key_env: "DASHSCOPE_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AgentConfig {
    pub fn url(&self) -> String {
        format!(
            "{}/api/v1/apps/{}/completion",
            self.base_url.trim_end_matches('/'),
            self.app_id.trim()
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// Application id and credential are both set
    pub fn is_configured(&self) -> bool {
        !self.app_id.trim().is_empty() && self.api_key().is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WakeConfig {
    pub phrases: Vec<String>,
    /// Anything shorter is treated as noise
    pub min_text_chars: usize,
    /// Text longer than this passes without a wake phrase
    pub min_non_wake_chars: usize,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            phrases: vec![
                "assistant".to_string(),
                "hello".to_string(),
                "excuse me".to_string(),
                "help".to_string(),
            ],
            min_text_chars: 2,
            min_non_wake_chars: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    pub terminal_marks: String,
    pub default_mark: char,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            terminal_marks: "。！？.!?".to_string(),
            default_mark: '。',
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub queue_capacity: usize,
    pub enqueue_timeout_ms: u64,
    pub join_timeout_ms: u64,
    /// Synthesizer executable; empty logs replies instead of speaking
    pub command: String,
    /// Words per minute
    pub rate: u32,
    /// 0.0 ..= 1.0
    pub volume: f32,
    pub voice: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            enqueue_timeout_ms: 2000,
            join_timeout_ms: 2000,
            command: "espeak-ng".to_string(),
            rate: 200,
            volume: 0.8,
            voice: None,
        }
    }
}

impl TtsConfig {
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

/// Canned replies. No raw failure detail ever reaches the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Spoken once at startup; empty disables it
    pub greeting: String,
    pub legal_failure: String,
    pub legal_unconfigured: String,
    pub general_unavailable: String,
    pub general_timeout: String,
    pub refusal: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello, how can I help you?".to_string(),
            legal_failure: "Sorry, the legal assistant is unavailable right now.".to_string(),
            legal_unconfigured: "Sorry, the legal assistant is not configured.".to_string(),
            general_unavailable: "Sorry, I can't reach the assistant right now.".to_string(),
            general_timeout: "Sorry, the assistant took too long to answer.".to_string(),
            refusal: "Sorry, I can't answer questions in that field yet.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Address for the control API, e.g. "127.0.0.1:8088"; disabled when unset
    pub bind: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PTT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
