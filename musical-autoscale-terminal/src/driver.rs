use std::fmt;

use log::{debug, error, info, trace};
use musical_autoscale_core::ScopeSession;
use musical_autoscale_core::fps::FpsTracker;

use crate::Frame;

/// lane levels as one digit each. 0 is silent, 9 is the top of the display
pub struct LaneBars<'a>(pub &'a [f64]);

impl fmt::Display for LaneBars<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &level in self.0 {
            // the scaler can overshoot. the display can't
            let digit = (level.clamp(0.0, 1.0) * 9.0).round() as u8;

            write!(f, "{digit}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub waveform_frames: u64,
    pub frequency_frames: u64,
    /// frequency frames that had no centroid
    pub silent_frames: u64,
    pub resets: u64,
    pub last_levels: Vec<f64>,
    pub last_centroid: Option<f64>,
}

/// apply every frame from `rx` to the session until the producer hangs up
pub fn run_session<const LANES: usize>(
    session: &mut ScopeSession<LANES>,
    rx: &flume::Receiver<Frame>,
) -> SessionSummary {
    let mut summary = SessionSummary::default();
    let mut fps = FpsTracker::new();

    while let Ok(frame) = rx.recv() {
        match frame {
            Frame::Waveform(samples) => {
                let levels = session.on_waveform(&samples);

                debug!("lanes: {}", LaneBars(levels));

                summary.waveform_frames += 1;
                summary.last_levels = levels.to_vec();

                fps.tick(samples.len());
            }
            Frame::Frequency(bins) => {
                summary.frequency_frames += 1;

                match session.on_frequency(&bins) {
                    Some(centroid) => {
                        debug!("centroid: {centroid:.3}");

                        summary.last_centroid = Some(centroid);
                    }
                    None => {
                        trace!("silent frame");

                        summary.silent_frames += 1;
                    }
                }
            }
            Frame::Reset => match session.reset() {
                Ok(()) => summary.resets += 1,
                Err(err) => error!("reset failed: {err}"),
            },
        }
    }

    info!(
        "done. {} waveform frames, {} frequency frames ({} silent)",
        summary.waveform_frames, summary.frequency_frames, summary.silent_frames
    );

    summary
}
