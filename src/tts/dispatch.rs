use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::sink::{DisplayRole, DisplaySink, SpeechEngine};
use crate::config::TtsConfig;

/// Queue message: text to deliver, or the stop sentinel
enum TtsMessage {
    Speak(String),
    Stop,
}

/// What happened to an enqueued item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Accepted; will be delivered in order
    Queued,
    /// Queue stayed full for the whole timeout; the item is gone
    Dropped,
    /// Dispatcher already shut down
    Closed,
}

struct TtsWorker {
    tx: Sender<TtsMessage>,
    handle: JoinHandle<()>,
}

/// Bounded hand-off between the main loop and the speech worker
///
/// The main loop enqueues replies; one background thread displays and
/// speaks them strictly in order. Enqueue waits at most the configured
/// timeout for space and otherwise drops the item, so a stuck
/// synthesizer can never stall the main loop.
///
/// The channel and thread are created on the first enqueue.
///
/// Shutdown policy: the stop sentinel is queued behind any pending items
/// and the worker gets `join_timeout` to drain them. Whatever is still
/// queued after that is abandoned with the detached thread.
pub struct TtsDispatcher {
    display: Arc<dyn DisplaySink>,
    speech: Arc<dyn SpeechEngine>,
    capacity: usize,
    enqueue_timeout: Duration,
    join_timeout: Duration,
    worker: Option<TtsWorker>,
    closed: bool,
    dropped: usize,
}

impl TtsDispatcher {
    pub fn new(
        display: Arc<dyn DisplaySink>,
        speech: Arc<dyn SpeechEngine>,
        config: &TtsConfig,
    ) -> Self {
        Self {
            display,
            speech,
            capacity: config.queue_capacity.max(1),
            enqueue_timeout: config.enqueue_timeout(),
            join_timeout: config.join_timeout(),
            worker: None,
            closed: false,
            dropped: 0,
        }
    }

    /// Whether the worker thread has been spawned yet
    pub fn is_started(&self) -> bool {
        self.worker.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Items dropped because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Items waiting in the queue
    pub fn queued(&self) -> usize {
        self.worker.as_ref().map_or(0, |w| w.tx.len())
    }

    pub fn enqueue(&mut self, text: impl Into<String>) -> EnqueueOutcome {
        if self.closed {
            warn!("TTS dispatcher is closed, discarding item");
            return EnqueueOutcome::Closed;
        }

        let worker = match self.worker.take() {
            Some(worker) => worker,
            None => match self.spawn_worker() {
                Ok(worker) => worker,
                Err(e) => {
                    error!("Failed to start TTS worker: {}", e);
                    return EnqueueOutcome::Closed;
                }
            },
        };
        let worker = self.worker.insert(worker);

        match worker
            .tx
            .send_timeout(TtsMessage::Speak(text.into()), self.enqueue_timeout)
        {
            Ok(()) => EnqueueOutcome::Queued,
            Err(SendTimeoutError::Timeout(_)) => {
                self.dropped += 1;
                warn!(
                    "TTS queue full for {:?}, dropping item ({} dropped so far)",
                    self.enqueue_timeout, self.dropped
                );
                EnqueueOutcome::Dropped
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                error!("TTS worker has exited, closing dispatcher");
                self.closed = true;
                EnqueueOutcome::Closed
            }
        }
    }

    /// Stop the worker. Returns `true` if it exited within `join_timeout`.
    pub fn shutdown(&mut self) -> bool {
        self.closed = true;

        let Some(worker) = self.worker.take() else {
            return true;
        };

        if worker
            .tx
            .send_timeout(TtsMessage::Stop, self.enqueue_timeout)
            .is_err()
        {
            warn!("Could not queue TTS stop signal, closing channel instead");
        }
        let pending = worker.tx.len();
        // Closing the sender also ends the worker's receive loop
        drop(worker.tx);

        let deadline = Instant::now() + self.join_timeout;
        while !worker.handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    "TTS worker did not stop within {:?}, abandoning up to {} queued items",
                    self.join_timeout, pending
                );
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }

        if worker.handle.join().is_err() {
            error!("TTS worker panicked");
        }

        info!("TTS worker shut down");
        true
    }

    fn spawn_worker(&self) -> std::io::Result<TtsWorker> {
        let (tx, rx) = bounded(self.capacity);
        let display = Arc::clone(&self.display);
        let speech = Arc::clone(&self.speech);

        let handle = thread::Builder::new()
            .name("tts-worker".to_string())
            .spawn(move || run_worker(rx, display, speech))?;

        info!("TTS worker started (queue capacity {})", self.capacity);

        Ok(TtsWorker { tx, handle })
    }
}

impl Drop for TtsDispatcher {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.shutdown();
        }
    }
}

fn run_worker(rx: Receiver<TtsMessage>, display: Arc<dyn DisplaySink>, speech: Arc<dyn SpeechEngine>) {
    for message in rx.iter() {
        let text = match message {
            TtsMessage::Speak(text) => text,
            TtsMessage::Stop => break,
        };

        debug!("TTS item: {}", text);
        display.display(&text, DisplayRole::Assistant);

        // One bad item must not take the worker down
        match panic::catch_unwind(AssertUnwindSafe(|| speech.speak(&text))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Speech synthesis failed: {}", e),
            Err(_) => error!("Speech synthesis panicked"),
        }
    }

    debug!("TTS worker loop finished");
}
