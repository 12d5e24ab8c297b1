use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::buffer::AudioBuffer;

/// Keeps a WAV copy of every recording sent for transcription
///
/// Files are named `recording_<utc timestamp>.wav`. Debugging aid only:
/// failures are reported to the caller, who logs and carries on.
pub struct RecordingArchive {
    dir: PathBuf,
}

impl RecordingArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        // Create output directory if it doesn't exist
        fs::create_dir_all(&dir).context("Failed to create archive directory")?;

        info!("Recording archive initialized: {}", dir.display());

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the buffer to a new WAV file and return its path
    pub fn save(&self, buffer: &AudioBuffer) -> Result<PathBuf> {
        let file_path = self.next_path();
        let format = buffer.format();

        let spec = hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer: hound::WavWriter<BufWriter<File>> =
            hound::WavWriter::create(&file_path, spec)
                .with_context(|| format!("Failed to create WAV file: {:?}", file_path))?;

        for sample in buffer.samples() {
            writer
                .write_sample(sample)
                .context("Failed to write sample to WAV")?;
        }

        writer.finalize().context("Failed to finalize WAV file")?;

        debug!(
            "Archived {:.2}s recording to {}",
            buffer.duration_secs(),
            file_path.display()
        );

        Ok(file_path)
    }

    fn next_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let mut path = self.dir.join(format!("recording_{}.wav", stamp));

        // Two recordings inside the same millisecond
        let mut n = 1;
        while path.exists() {
            warn!("Archive file already exists: {}", path.display());
            path = self.dir.join(format!("recording_{}_{}.wav", stamp, n));
            n += 1;
        }

        path
    }
}
