// Shared fakes for integration tests
//
// Every external collaborator (speech recognition, language model, knowledge
// service, display, speech synthesis, control input) has an in-memory
// stand-in here that records how it was called.

#![allow(dead_code)]

use crossbeam_channel::{Receiver, Sender};
use ptt_assistant::audio::AudioFormat;
use ptt_assistant::error::{Error, Result};
use ptt_assistant::knowledge::{KnowledgeBase, KnowledgeReply};
use ptt_assistant::llm::ChatModel;
use ptt_assistant::pipeline::{ControlEvent, ControlSource};
use ptt_assistant::tts::{DisplayRole, DisplaySink, SpeechEngine};
use ptt_assistant::SpeechRecognizer;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// `secs` seconds of silent 16-bit PCM
pub fn pcm(secs: f64, format: AudioFormat) -> Vec<u8> {
    let bytes = (secs * format.bytes_per_second() as f64) as usize;
    vec![0u8; bytes - bytes % 2]
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

// ============================================================================
// Speech recognition
// ============================================================================

/// Returns a fixed payload, or fails when constructed with `failing`
pub struct FakeRecognizer {
    payload: Option<Value>,
    calls: Arc<AtomicUsize>,
    wavs: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl FakeRecognizer {
    pub fn returning(payload: Value) -> Self {
        Self {
            payload: Some(payload),
            calls: Arc::new(AtomicUsize::new(0)),
            wavs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            payload: None,
            calls: Arc::new(AtomicUsize::new(0)),
            wavs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Call counter that stays readable after the fake is boxed
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Every WAV file received, in call order
    pub fn wavs(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.wavs)
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn recognize(&self, wav: &[u8], _language: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(wav.starts_with(b"RIFF"), "recognizer should receive a WAV file");
        self.wavs.lock().unwrap().push(wav.to_vec());

        self.payload
            .clone()
            .ok_or_else(|| Error::Transport("connection refused".to_string()))
    }
}

// ============================================================================
// Language model
// ============================================================================

pub enum ChatScript {
    Reply(String),
    Timeout,
    Fail,
}

/// Replays scripted replies, then `fallback` forever
pub struct FakeChat {
    script: Mutex<VecDeque<ChatScript>>,
    fallback: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeChat {
    pub fn replying(reply: &str) -> Self {
        Self::scripted(Vec::new(), reply)
    }

    pub fn scripted(script: Vec<ChatScript>, fallback: &str) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: fallback.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// (system, user) pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChatModel for FakeChat {
    fn chat(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));

        match self.script.lock().unwrap().pop_front() {
            Some(ChatScript::Reply(reply)) => Ok(reply),
            Some(ChatScript::Timeout) => Err(Error::Timeout("operation timed out".to_string())),
            Some(ChatScript::Fail) => Err(Error::Transport("HTTP 500".to_string())),
            None => Ok(self.fallback.clone()),
        }
    }
}

// ============================================================================
// Knowledge service
// ============================================================================

pub enum KnowledgeScript {
    Reply(KnowledgeReply),
    Fail,
}

pub fn knowledge_reply(answer: &str, conversation_id: Option<&str>) -> KnowledgeScript {
    KnowledgeScript::Reply(KnowledgeReply {
        answer: answer.to_string(),
        conversation_id: conversation_id.map(str::to_string),
    })
}

/// Replays scripted replies and records (query, conversation id) per call
pub struct FakeKnowledge {
    script: Mutex<VecDeque<KnowledgeScript>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeKnowledge {
    pub fn scripted(script: Vec<KnowledgeScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Conversation ids sent, in call order
    pub fn tokens_sent(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, token)| token).collect()
    }
}

impl KnowledgeBase for FakeKnowledge {
    fn ask(&self, query: &str, conversation_id: &str) -> Result<KnowledgeReply> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), conversation_id.to_string()));

        match self.script.lock().unwrap().pop_front() {
            Some(KnowledgeScript::Reply(reply)) => Ok(reply),
            Some(KnowledgeScript::Fail) | None => {
                Err(Error::Transport("knowledge backend error 502".to_string()))
            }
        }
    }
}

// ============================================================================
// Output sinks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Display(String, DisplayRole),
    Speak(String),
}

/// One log shared by display and speaker, so ordering across both is visible
pub type SinkLog = Arc<Mutex<Vec<SinkEvent>>>;

pub fn sink_log() -> SinkLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn spoken(log: &SinkLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            SinkEvent::Speak(text) => Some(text.clone()),
            SinkEvent::Display(..) => None,
        })
        .collect()
}

pub struct RecordingDisplay(pub SinkLog);

impl DisplaySink for RecordingDisplay {
    fn display(&self, text: &str, role: DisplayRole) {
        self.0
            .lock()
            .unwrap()
            .push(SinkEvent::Display(text.to_string(), role));
    }
}

pub struct RecordingSpeaker(pub SinkLog);

impl SpeechEngine for RecordingSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        self.0.lock().unwrap().push(SinkEvent::Speak(text.to_string()));
        Ok(())
    }
}

/// Fails on texts containing "boom", speaks everything else
pub struct FlakySpeaker(pub SinkLog);

impl SpeechEngine for FlakySpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        if text.contains("boom") {
            return Err(Error::Audio("synthesizer crashed".to_string()));
        }
        self.0.lock().unwrap().push(SinkEvent::Speak(text.to_string()));
        Ok(())
    }
}

/// Announces each item on `started`, then blocks until the gate releases it
pub struct GatedSpeaker {
    pub log: SinkLog,
    pub started: Sender<String>,
    pub gate: Receiver<()>,
}

impl SpeechEngine for GatedSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        let _ = self.started.send(text.to_string());
        let _ = self.gate.recv();
        self.log.lock().unwrap().push(SinkEvent::Speak(text.to_string()));
        Ok(())
    }
}

// ============================================================================
// Control input
// ============================================================================

/// Replays events one poll at a time. `None` ends the current loop tick;
/// once the script runs out it answers `Quit`.
pub struct ScriptedControl {
    script: VecDeque<Option<ControlEvent>>,
}

impl ScriptedControl {
    pub fn new(script: Vec<Option<ControlEvent>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl ControlSource for ScriptedControl {
    fn poll(&mut self) -> Option<ControlEvent> {
        match self.script.pop_front() {
            Some(event) => event,
            None => Some(ControlEvent::Quit),
        }
    }
}
