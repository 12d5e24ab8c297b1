//! Error types for the assistant pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by backend clients and capture collaborators.
///
/// None of these cross the main loop: every backend-facing component
/// catches its own failures and degrades to an empty or canned result.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure or non-success HTTP status
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded its deadline
    #[error("timed out: {0}")]
    Timeout(String),

    /// Backend answered with a payload we could not make sense of
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Missing credential or model name
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Recording too short to be worth transcribing
    #[error("recording too short ({0:.2}s)")]
    Silence(f64),

    /// Audio capture or encoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures caused by the network path (including timeouts)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout(_))
    }

    /// True when the request exceeded its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else if e.is_decode() {
            Error::MalformedResponse(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedResponse(e.to_string())
    }
}

impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Audio(e.to_string())
    }
}
