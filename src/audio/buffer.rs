use crate::error::Result;
use std::io::Cursor;

use super::backend::AudioFormat;

/// Raw PCM accumulated during one recording session
///
/// Single writer: the main loop appends while recording, then the whole
/// buffer is moved into transcription. Nothing holds a reference across
/// that handoff, so no locking is needed.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    data: Vec<u8>,
    format: AudioFormat,
}

impl AudioBuffer {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            data: Vec::new(),
            format,
        }
    }

    /// Wrap bytes that were captured elsewhere
    pub fn from_bytes(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    pub fn append(&mut self, frame: &[u8]) {
        self.data.extend_from_slice(frame);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Duration in seconds = bytes / (sample_rate * channels * 2)
    pub fn duration_secs(&self) -> f64 {
        self.data.len() as f64 / self.format.bytes_per_second().max(1) as f64
    }

    /// Decode the little-endian byte stream into samples (a trailing odd byte is ignored)
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Encode as an in-memory WAV file
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in self.samples() {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }

        Ok(cursor.into_inner())
    }
}
