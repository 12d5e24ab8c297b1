//! Push-to-talk recording
//!
//! `RecordingStateMachine` owns the buffer for the one active recording and
//! hands it over, by move, once capture stops.

mod session;

pub use session::{RecordingSession, RecordingState, RecordingStateMachine, Toggle};
