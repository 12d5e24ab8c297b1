use tracing::{debug, error, info, warn};

use super::client::SpeechRecognizer;
use super::extract::extract_text;
use crate::audio::{AudioBuffer, RecordingArchive};
use crate::config::AsrConfig;
use crate::error::{Error, Result};

/// Turns a finished recording into text. Never fails: every problem
/// (short recording, network, bad payload) comes back as "".
pub struct TranscriptionGateway {
    backend: Box<dyn SpeechRecognizer>,
    language: String,
    min_duration_secs: f64,
    archive: Option<RecordingArchive>,
}

impl TranscriptionGateway {
    pub fn new(backend: Box<dyn SpeechRecognizer>, config: &AsrConfig) -> Self {
        Self {
            backend,
            language: config.language.clone(),
            min_duration_secs: config.min_duration_secs,
            archive: None,
        }
    }

    /// Also keep a WAV copy of each recording that gets transcribed
    pub fn with_archive(mut self, archive: RecordingArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Consumes the buffer; it is gone once the attempt is over.
    pub fn transcribe(&self, buffer: AudioBuffer) -> String {
        match self.try_transcribe(&buffer) {
            Ok(text) => text,
            Err(Error::Silence(duration)) => {
                debug!("Recording too short ({:.2}s), skipping transcription", duration);
                String::new()
            }
            Err(e) => {
                error!("Transcription failed: {}", e);
                String::new()
            }
        }
    }

    fn try_transcribe(&self, buffer: &AudioBuffer) -> Result<String> {
        let duration = buffer.duration_secs();
        debug!(
            "Audio buffer: {} bytes, {:.2}s",
            buffer.len(),
            duration
        );

        if duration < self.min_duration_secs {
            return Err(Error::Silence(duration));
        }

        if let Some(archive) = &self.archive {
            if let Err(e) = archive.save(buffer) {
                warn!("Failed to archive recording: {:#}", e);
            }
        }

        let wav = buffer.to_wav()?;
        let payload = self.backend.recognize(&wav, &self.language)?;
        let text = extract_text(&payload);

        if text.is_empty() {
            debug!("Recognizer returned no text");
        } else {
            info!("Recognized: '{}'", text);
        }

        Ok(text)
    }
}
