use crate::pipeline::{ControlEvent, SharedStatus};
use crossbeam_channel::Sender;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Feeds toggle/quit events into the main loop
    pub control: Sender<ControlEvent>,

    /// Latest snapshot published by the main loop
    pub status: SharedStatus,
}

impl AppState {
    pub fn new(control: Sender<ControlEvent>, status: SharedStatus) -> Self {
        Self { control, status }
    }
}
