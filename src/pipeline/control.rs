use crossbeam_channel::{Receiver, Sender};
use std::io::BufRead;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Push-to-talk control input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Start or stop recording
    Toggle,
    /// Leave the main loop
    Quit,
}

/// Non-blocking source of control events, polled once per loop iteration
pub trait ControlSource {
    fn poll(&mut self) -> Option<ControlEvent>;
}

impl ControlSource for Receiver<ControlEvent> {
    fn poll(&mut self) -> Option<ControlEvent> {
        self.try_recv().ok()
    }
}

/// Map one line of console input to an event.
///
/// An empty line or `t` toggles recording, `q` quits.
pub fn parse_command(line: &str) -> Option<ControlEvent> {
    match line.trim().to_lowercase().as_str() {
        "" | "t" | "toggle" => Some(ControlEvent::Toggle),
        "q" | "quit" | "exit" => Some(ControlEvent::Quit),
        _ => None,
    }
}

/// Read control commands from stdin on a background thread
pub fn spawn_stdin_control(tx: Sender<ControlEvent>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-control".to_string())
        .spawn(move || {
            info!("Press Enter to start/stop recording, 'q' + Enter to quit");

            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        break;
                    }
                };

                let Some(event) = parse_command(&line) else {
                    debug!("Unknown command: {:?}", line);
                    continue;
                };

                if tx.send(event).is_err() || event == ControlEvent::Quit {
                    break;
                }
            }

            debug!("Stdin control stopped");
        })
}
