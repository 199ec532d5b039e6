//! Stand-in for the audio pipeline. Frames are generated on one thread and scaled on another.
mod config;
mod driver;
mod source;

pub use config::DriverConfig;
pub use driver::{LaneBars, SessionSummary, run_session};
pub use source::{FrameSource, FrameStream, SyntheticSource};

/// everything the producer can send to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// time domain bytes centered on 128
    Waveform(Vec<u8>),
    /// frequency bin magnitudes
    Frequency(Vec<u8>),
    /// start the session over
    Reset,
}
