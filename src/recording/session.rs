use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audio::{AudioBuffer, AudioFormat};

/// Push-to-talk recording state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    /// Not capturing
    Idle,
    /// Capturing frames into the buffer
    Recording,
    /// Capture stopped, buffer frozen and waiting for the main loop
    PendingProcess,
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Idle -> Recording
    Started,
    /// Recording -> PendingProcess
    Stopped,
    /// A frozen buffer is still waiting; nothing changed
    Rejected,
}

/// A finished recording handed over for processing
#[derive(Debug)]
pub struct RecordingSession {
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub buffer: AudioBuffer,
}

impl RecordingSession {
    pub fn duration_secs(&self) -> f64 {
        self.buffer.duration_secs()
    }
}

/// Idle -> Recording -> PendingProcess -> Idle
///
/// Owns the audio buffer. Only the main loop touches it: frames are
/// appended while recording, and the buffer is moved out whole by
/// [`take_pending`](Self::take_pending) once capture stops.
///
/// A toggle while a buffer is pending is rejected, so two recordings
/// never overlap.
pub struct RecordingStateMachine {
    state: RecordingState,
    buffer: AudioBuffer,
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    taken: bool,
}

impl RecordingStateMachine {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            state: RecordingState::Idle,
            buffer: AudioBuffer::new(format),
            started_at: None,
            stopped_at: None,
            taken: false,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// True while a frozen buffer has not been taken yet
    pub fn has_pending(&self) -> bool {
        self.state == RecordingState::PendingProcess && !self.taken
    }

    /// When the current (or last) recording started
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Format of the samples in the buffer
    pub fn format(&self) -> AudioFormat {
        self.buffer.format()
    }

    /// Switch the capture format for the next recording.
    ///
    /// Only takes effect while Idle; a running or pending recording keeps
    /// the format its bytes were captured in.
    pub fn set_format(&mut self, format: AudioFormat) -> bool {
        if self.state != RecordingState::Idle {
            return false;
        }
        if self.buffer.format() != format {
            info!(
                "Capture format is now {} Hz / {} ch",
                format.sample_rate, format.channels
            );
            self.buffer = AudioBuffer::new(format);
        }
        true
    }

    /// Bytes captured so far in the current session
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn toggle(&mut self) -> Toggle {
        match self.state {
            RecordingState::Idle => {
                self.buffer.clear();
                self.started_at = Some(Utc::now());
                self.stopped_at = None;
                self.taken = false;
                self.state = RecordingState::Recording;
                info!("Recording started");
                Toggle::Started
            }
            RecordingState::Recording => {
                self.stopped_at = Some(Utc::now());
                self.state = RecordingState::PendingProcess;
                info!(
                    "Recording stopped: {:.2}s captured, processing",
                    self.buffer.duration_secs()
                );
                Toggle::Stopped
            }
            RecordingState::PendingProcess => {
                warn!("Previous recording is still being processed, ignoring toggle");
                Toggle::Rejected
            }
        }
    }

    /// Append a captured frame; ignored unless recording
    pub fn append(&mut self, frame: &[u8]) -> bool {
        if self.state != RecordingState::Recording {
            return false;
        }
        self.buffer.append(frame);
        true
    }

    /// Move the frozen buffer out for processing.
    ///
    /// Returns `None` unless a recording is pending. The state stays
    /// `PendingProcess` until [`complete`](Self::complete) is called.
    pub fn take_pending(&mut self) -> Option<RecordingSession> {
        if !self.has_pending() {
            return None;
        }

        self.taken = true;
        let format = self.buffer.format();
        let buffer = std::mem::replace(&mut self.buffer, AudioBuffer::new(format));
        let now = Utc::now();

        debug!("Handing {} bytes to transcription", buffer.len());

        Some(RecordingSession {
            started_at: self.started_at.unwrap_or(now),
            stopped_at: self.stopped_at.unwrap_or(now),
            buffer,
        })
    }

    /// Pending work is done: back to Idle
    pub fn complete(&mut self) {
        if self.state == RecordingState::PendingProcess {
            self.buffer.clear();
            self.taken = false;
            self.state = RecordingState::Idle;
        }
    }
}
