//! Split a waveform frame into display lanes. Each lane shows one scaled sample.
use super::AdaptiveScaler;
use crate::logging::{debug, trace};

/// Time domain bytes are centered on 128. Square the distance from the center so loud is big no matter the sign.
#[inline]
pub fn byte_magnitude(sample: u8) -> f64 {
    let centered = sample as f64 - 128.0;

    centered * centered
}

/// LANES = number of things on the display that move with the waveform
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaveformLanes<const LANES: usize> {
    scaler: AdaptiveScaler,
    /// latest scaled level for each lane. lanes that weren't reached by the last frame keep their old level
    levels: [f64; LANES],
    /// horizontal position of the sample that set each level. 0.0 is the left edge, 1.0 is the right
    positions: [f64; LANES],
}

impl<const LANES: usize> WaveformLanes<LANES> {
    /// Zero lanes is a compile error:
    ///
    /// ```compile_fail
    /// use musical_autoscale_core::audio::{AdaptiveScaler, WaveformLanes};
    ///
    /// let _ = WaveformLanes::<0>::new(AdaptiveScaler::default());
    /// ```
    pub fn new(scaler: AdaptiveScaler) -> Self {
        const { assert!(LANES > 0, "need at least one lane") };

        let mut positions = [0.0; LANES];
        for (i, x) in positions.iter_mut().enumerate() {
            *x = i as f64 / LANES as f64;
        }

        Self {
            scaler,
            levels: [0.0; LANES],
            positions,
        }
    }

    /// scale the first sample that lands in each lane. the rest of the frame is ignored
    ///
    /// A frame shorter than LANES skips some lanes. Those keep their previous level.
    pub fn update(&mut self, frame: &[u8]) -> &[f64; LANES] {
        let len = frame.len();

        if len == 0 {
            debug!("empty waveform frame");
            return &self.levels;
        }

        let mut next_lane = 0;

        for (i, &sample) in frame.iter().enumerate() {
            let lane = i * LANES / len;

            if next_lane <= lane {
                let level = self.scaler.update_and_scale(byte_magnitude(sample));

                trace!("lane {} <- sample {} ({}) = {}", lane, i, sample, level);

                self.levels[lane] = level;
                self.positions[lane] = i as f64 / len as f64;

                next_lane += 1;
            }
        }

        &self.levels
    }

    pub fn levels(&self) -> &[f64; LANES] {
        &self.levels
    }

    pub fn positions(&self) -> &[f64; LANES] {
        &self.positions
    }

    /// (position, level) for every lane, left to right
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.positions
            .iter()
            .copied()
            .zip(self.levels.iter().copied())
    }

    pub fn scaler(&self) -> &AdaptiveScaler {
        &self.scaler
    }
}
