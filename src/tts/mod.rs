//! Reply delivery: bounded queue, speech worker thread, output sinks

mod dispatch;
mod sink;

pub use dispatch::{EnqueueOutcome, TtsDispatcher};
pub use sink::{CommandSpeaker, ConsoleDisplay, DisplayRole, DisplaySink, LogSpeaker, SpeechEngine};
