//! The push-to-talk main loop and its control inputs

mod control;
mod runner;
mod status;

pub use control::{parse_command, spawn_stdin_control, ControlEvent, ControlSource};
pub use runner::{Pipeline, PipelineBackends, TurnOutcome};
pub use status::{PipelineStatus, SharedStatus, Utterance};
