use crate::error::{Error, Result};
use hound::WavReader;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// PCM layout delivered by a capture source (always 16-bit little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Bytes of 16-bit PCM per second of audio
    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate as usize * self.channels as usize * 2
    }

    /// Wall-clock length of `frames` frames
    pub fn frames_duration(&self, frames: usize) -> Duration {
        Duration::from_secs_f64(frames as f64 / self.sample_rate.max(1) as f64)
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // SenseVoice expects 16kHz
            channels: 1,        // Mono
        }
    }
}

/// Audio capture collaborator
///
/// The main loop reads one buffer per iteration. Implementations:
/// - `WavFileSource`: replays a WAV file in real time (bench testing, demos)
/// - `SilenceSource`: zeros, for devices without a microphone attached
///
/// Microphone drivers live outside this crate and plug in through this trait.
pub trait AudioSource: Send {
    /// Read `frames` frames of interleaved 16-bit PCM.
    ///
    /// Blocks for at most one buffer period.
    fn read_frame(&mut self, frames: usize) -> Result<Vec<u8>>;

    /// Re-open the underlying device after a failed read
    fn reset(&mut self) -> Result<()>;

    /// Format of the bytes returned by `read_frame`
    fn format(&self) -> AudioFormat;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Emits silence at the configured format
pub struct SilenceSource {
    format: AudioFormat,
    paced: bool,
}

impl SilenceSource {
    /// Silence delivered in real time, like a muted microphone
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            paced: true,
        }
    }

    /// Silence delivered as fast as it is read
    pub fn unpaced(format: AudioFormat) -> Self {
        Self {
            format,
            paced: false,
        }
    }
}

impl AudioSource for SilenceSource {
    fn read_frame(&mut self, frames: usize) -> Result<Vec<u8>> {
        if self.paced {
            std::thread::sleep(self.format.frames_duration(frames));
        }
        Ok(vec![0u8; frames * self.format.channels as usize * 2])
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn name(&self) -> &str {
        "silence"
    }
}

/// Replays a 16-bit PCM WAV file as if it were a microphone, looping at the end
pub struct WavFileSource {
    path: String,
    format: AudioFormat,
    samples: Vec<i16>,
    position: usize,
    paced: bool,
}

impl WavFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)?;

        let spec = reader.spec();
        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(Error::Audio(format!(
                "{} is not 16-bit PCM ({} bits, {:?})",
                path.display(),
                spec.bits_per_sample,
                spec.sample_format
            )));
        }

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if samples.is_empty() {
            return Err(Error::Audio(format!("{} contains no samples", path.display())));
        }

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            format: AudioFormat::new(spec.sample_rate, spec.channels),
            samples,
            position: 0,
            paced: true,
        })
    }

    /// Deliver frames without real-time pacing
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl AudioSource for WavFileSource {
    fn read_frame(&mut self, frames: usize) -> Result<Vec<u8>> {
        let wanted = frames * self.format.channels as usize;
        let mut out = Vec::with_capacity(wanted * 2);

        while out.len() < wanted * 2 {
            if self.position >= self.samples.len() {
                self.position = 0;
            }
            let remaining = wanted - out.len() / 2;
            let end = (self.position + remaining).min(self.samples.len());
            out.extend(
                self.samples[self.position..end]
                    .iter()
                    .flat_map(|s| s.to_le_bytes()),
            );
            self.position = end;
        }

        if self.paced {
            std::thread::sleep(self.format.frames_duration(frames));
        }

        Ok(out)
    }

    fn reset(&mut self) -> Result<()> {
        warn!("Rewinding audio file: {}", self.path);
        self.position = 0;
        Ok(())
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}
