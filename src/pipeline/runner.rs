use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::control::{ControlEvent, ControlSource};
use super::status::{SharedStatus, Utterance};
use crate::asr::{SpeechRecognizer, TranscriptionGateway};
use crate::audio::{AudioSource, RecordingArchive};
use crate::config::Config;
use crate::knowledge::KnowledgeBase;
use crate::llm::{ChatModel, QueryCategory, QueryClassifier};
use crate::recording::{RecordingStateMachine, Toggle};
use crate::router::BackendRouter;
use crate::tts::{DisplayRole, DisplaySink, SpeechEngine, TtsDispatcher};
use crate::wake::WakeFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// External collaborators the pipeline talks to
pub struct PipelineBackends {
    pub recognizer: Box<dyn SpeechRecognizer>,
    /// Model used for classification
    pub classifier: Arc<dyn ChatModel>,
    /// Model used to answer general questions
    pub general: Arc<dyn ChatModel>,
    /// `None` disables legal answers
    pub knowledge: Option<Arc<dyn KnowledgeBase>>,
    /// Cloud agent for general questions; `None` keeps them on `general`
    pub agent: Option<Arc<dyn KnowledgeBase>>,
    pub display: Arc<dyn DisplaySink>,
    pub speech: Arc<dyn SpeechEngine>,
}

/// How a pending recording was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing was waiting
    NoRecording,
    /// No usable speech in the recording
    Silence,
    /// Speech recognized but not meant for the assistant
    Filtered,
    /// Routed to a backend; the reply went to the speech queue
    Answered(QueryCategory),
}

/// The whole push-to-talk loop as one value
///
/// Owns the recorder, the router (and with it every conversation token)
/// and the speech dispatcher. All of it is driven from a single thread;
/// only the speech worker runs elsewhere, fed through the dispatcher's
/// queue.
pub struct Pipeline {
    recorder: RecordingStateMachine,
    gateway: TranscriptionGateway,
    wake: WakeFilter,
    classifier: QueryClassifier,
    router: BackendRouter,
    tts: TtsDispatcher,
    display: Arc<dyn DisplaySink>,
    status: SharedStatus,
    greeting: String,
    frames_per_buffer: usize,
    turns: usize,
    last_utterance: Option<Utterance>,
}

impl Pipeline {
    pub fn new(config: &Config, backends: PipelineBackends) -> Self {
        let PipelineBackends {
            recognizer,
            classifier,
            general,
            knowledge,
            agent,
            display,
            speech,
        } = backends;

        let mut router = BackendRouter::new(general, knowledge, config);
        if let Some(agent) = agent {
            router = router.with_agent(agent);
        }

        Self {
            recorder: RecordingStateMachine::new(config.audio.format()),
            gateway: TranscriptionGateway::new(recognizer, &config.asr),
            wake: WakeFilter::new(&config.wake),
            classifier: QueryClassifier::new(classifier, &config.classifier),
            router,
            tts: TtsDispatcher::new(Arc::clone(&display), speech, &config.tts),
            display,
            status: SharedStatus::default(),
            greeting: config.replies.greeting.clone(),
            frames_per_buffer: config.audio.frames_per_buffer.max(1),
            turns: 0,
            last_utterance: None,
        }
    }

    /// Keep a WAV copy of every transcribed recording
    pub fn with_archive(mut self, archive: RecordingArchive) -> Self {
        self.gateway = self.gateway.with_archive(archive);
        self
    }

    /// Handle for readers of the status snapshot
    pub fn status(&self) -> SharedStatus {
        self.status.clone()
    }

    pub fn recorder(&self) -> &RecordingStateMachine {
        &self.recorder
    }

    pub fn router(&self) -> &BackendRouter {
        &self.router
    }

    pub fn tts(&self) -> &TtsDispatcher {
        &self.tts
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Queue the startup greeting, if one is configured
    pub fn greet(&mut self) {
        let greeting = self.greeting.trim();
        if greeting.is_empty() {
            return;
        }
        self.tts.enqueue(greeting.to_string());
    }

    /// Apply one control event. Returns `false` when the loop should stop.
    pub fn handle_event(&mut self, event: ControlEvent, audio: &mut dyn AudioSource) -> bool {
        match event {
            ControlEvent::Quit => {
                info!("Quit requested");
                false
            }
            ControlEvent::Toggle => {
                // Buffer duration and the WAV header follow what the source delivers
                self.recorder.set_format(audio.format());
                if self.recorder.toggle() == Toggle::Started {
                    if let Err(e) = audio.reset() {
                        warn!("Failed to reset audio source {}: {}", audio.name(), e);
                    }
                }
                self.publish_status();
                true
            }
        }
    }

    /// Read one frame from the source into the buffer, if recording
    pub fn capture(&mut self, audio: &mut dyn AudioSource) {
        if !self.recorder.is_recording() {
            return;
        }

        match audio.read_frame(self.frames_per_buffer) {
            Ok(frame) => {
                self.recorder.append(&frame);
            }
            Err(e) => {
                warn!("Audio read failed on {}: {}, resetting source", audio.name(), e);
                if let Err(e) = audio.reset() {
                    warn!("Failed to reset audio source: {}", e);
                }
            }
        }
    }

    /// Run a frozen recording through transcription, routing and speech
    pub fn process_pending(&mut self) -> TurnOutcome {
        let Some(session) = self.recorder.take_pending() else {
            return TurnOutcome::NoRecording;
        };

        debug!(
            "Processing recording from {} ({:.2}s)",
            session.started_at,
            session.duration_secs()
        );

        let text = self.gateway.transcribe(session.buffer);
        let outcome = self.respond(&text);

        // The session closes only once its turn has been answered
        self.recorder.complete();
        self.publish_status();
        outcome
    }

    /// One loop iteration without the sleep. Returns `false` to stop.
    pub fn tick(&mut self, control: &mut dyn ControlSource, audio: &mut dyn AudioSource) -> bool {
        while let Some(event) = control.poll() {
            if !self.handle_event(event, audio) {
                return false;
            }
        }

        self.capture(audio);

        if self.recorder.has_pending() {
            self.process_pending();
        }

        true
    }

    /// Main loop: runs until `exit` is set or a quit event arrives, then
    /// shuts the speech worker down.
    pub fn run(
        &mut self,
        control: &mut dyn ControlSource,
        audio: &mut dyn AudioSource,
        exit: &AtomicBool,
    ) {
        info!("Assistant ready (audio source: {})", audio.name());
        self.greet();
        self.publish_status();

        while !exit.load(Ordering::SeqCst) {
            if !self.tick(control, audio) {
                exit.store(true, Ordering::SeqCst);
                break;
            }
            thread::sleep(POLL_INTERVAL);
        }

        self.shutdown();
    }

    /// Stop the speech worker. Returns `true` if it exited in time.
    pub fn shutdown(&mut self) -> bool {
        let joined = self.tts.shutdown();
        self.publish_status();
        info!("Pipeline stopped after {} turns", self.turns);
        joined
    }

    fn respond(&mut self, text: &str) -> TurnOutcome {
        if !self.wake.is_speech(text) {
            info!("No usable speech recognized");
            return TurnOutcome::Silence;
        }

        let utterance = Utterance::new(text);
        self.display.display(&utterance.text, DisplayRole::User);
        self.last_utterance = Some(utterance.clone());

        if !self.wake.should_process(&utterance.text) {
            info!(turn = %utterance.id, "Ignoring short utterance without wake phrase");
            return TurnOutcome::Filtered;
        }

        let category = self.classifier.classify(&utterance.text);
        info!(turn = %utterance.id, "Routing {} question", category);

        let tts = &mut self.tts;
        self.router
            .answer_with(&utterance.text, category, |reply| {
                tts.enqueue(reply);
            });
        self.turns += 1;

        TurnOutcome::Answered(category)
    }

    fn publish_status(&self) {
        let last_utterance = self.last_utterance.clone();
        self.status.update(|status| {
            status.state = self.recorder.state();
            status.turns = self.turns;
            status.tts_dropped = self.tts.dropped();
            status.legal_session_live = self.router.legal_session().is_live();
            status.agent_session_live = self.router.agent_session().is_live();
            status.last_utterance = last_utterance;
        });
    }
}
