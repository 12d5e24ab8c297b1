pub mod archive;
pub mod backend;
pub mod buffer;

pub use archive::RecordingArchive;
pub use backend::{AudioFormat, AudioSource, SilenceSource, WavFileSource};
pub use buffer::AudioBuffer;
