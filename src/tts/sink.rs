use serde::Serialize;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::config::TtsConfig;
use crate::error::{Error, Result};

/// Who a line of text belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayRole {
    User,
    Assistant,
    Plain,
}

/// Visual output (console, small OLED panel, ...)
pub trait DisplaySink: Send + Sync {
    fn display(&self, text: &str, role: DisplayRole);
}

/// Speech synthesizer. `speak` blocks until the audio has been played.
pub trait SpeechEngine: Send + Sync {
    fn speak(&self, text: &str) -> Result<()>;
}

/// Prints conversation lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn display(&self, text: &str, role: DisplayRole) {
        match role {
            DisplayRole::User => println!("You: {}", text),
            DisplayRole::Assistant => println!("Assistant: {}", text),
            DisplayRole::Plain => println!("{}", text),
        }
    }
}

/// Speech disabled: replies only go to the log
#[derive(Debug, Default)]
pub struct LogSpeaker;

impl SpeechEngine for LogSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        info!("(speech disabled) {}", text);
        Ok(())
    }
}

/// Runs an espeak-compatible synthesizer once per utterance
///
/// Invoked as `<command> -s <rate> -a <amplitude> [-v <voice>] -- <text>`,
/// so replies starting with `-` are spoken rather than parsed as options.
pub struct CommandSpeaker {
    program: String,
    rate: u32,
    amplitude: u32,
    voice: Option<String>,
}

impl CommandSpeaker {
    pub fn new(config: &TtsConfig) -> Result<Self> {
        if config.command.trim().is_empty() {
            return Err(Error::Configuration("no speech command configured".to_string()));
        }

        // espeak amplitude: 0-200, 100 is normal
        let amplitude = (config.volume.clamp(0.0, 2.0) * 100.0).round() as u32;

        Ok(Self {
            program: config.command.clone(),
            rate: config.rate,
            amplitude,
            voice: config.voice.clone(),
        })
    }
}

impl SpeechEngine for CommandSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(self.amplitude.to_string());
        if let Some(voice) = &self.voice {
            command.arg("-v").arg(voice);
        }

        debug!("Speaking {} chars with {}", text.chars().count(), self.program);

        let status = command
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            return Err(Error::Audio(format!("{} exited with {}", self.program, status)));
        }

        Ok(())
    }
}
