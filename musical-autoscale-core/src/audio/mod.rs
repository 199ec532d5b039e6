//! Audio frames to display levels
//!
//! Waveform bytes -> magnitudes -> WaveformLanes (AdaptiveScaler) -> lane levels
//! Frequency bins -> centroid -> StreamAggregator (AdaptiveScaler -> ExponentialSmoother) -> spectral position
pub mod adaptive_scaler;
pub mod centroid;
pub mod lanes;
pub mod smoothing;

pub use adaptive_scaler::AdaptiveScaler;
pub use centroid::{StreamAggregator, centroid};
pub use lanes::{WaveformLanes, byte_magnitude};
pub use smoothing::ExponentialSmoother;
