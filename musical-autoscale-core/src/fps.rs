use crate::logging::info;

use std::time::{Duration, Instant};

/// count frames and samples and log the rates about once a second
pub struct FpsTracker {
    last: Instant,
    frames: u64,
    samples: u64,
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            samples: 0,
        }
    }

    /// returns (frames per second, samples per second) when a report was logged
    pub fn tick(&mut self, samples: usize) -> Option<(u64, u64)> {
        self.frames += 1;
        self.samples += samples as u64;

        let now = Instant::now();
        let elapsed = now.duration_since(self.last);

        if elapsed < Duration::from_secs(1) {
            return None;
        }

        let millis = elapsed.as_millis().max(1) as u64;
        let fps = self.frames * 1_000 / millis;
        let sps = self.samples * 1_000 / millis;

        self.frames = 0;
        self.samples = 0;
        self.last = now;

        info!("FPS: {}. samples/s: {}", fps, sps);

        Some((fps, sps))
    }
}
