use core::borrow::Borrow;

use super::{AdaptiveScaler, ExponentialSmoother};
use crate::logging::trace;

/// Intensity-weighted mean bin index: `Σ(i * bins[i]) / Σ(bins[i])`
///
/// Silence (the bins sum to zero) has no centroid. Neither does anything else that would come out NaN or infinite.
pub fn centroid<I>(bins: I) -> Option<f64>
where
    I: IntoIterator,
    I::Item: Borrow<f64>,
{
    let mut weighted = 0.0;
    let mut total = 0.0;

    for (i, x) in bins.into_iter().enumerate() {
        let x = *x.borrow();

        weighted += i as f64 * x;
        total += x;
    }

    if total == 0.0 {
        return None;
    }

    let c = weighted / total;

    c.is_finite().then_some(c)
}

/// Reduce each frame of frequency bins to one smoothed, scaled number.
///
/// Has its own [`AdaptiveScaler`]. Don't share it with the waveform!
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamAggregator {
    scaler: AdaptiveScaler,
    smoother: ExponentialSmoother,
}

impl StreamAggregator {
    pub fn new(scaler: AdaptiveScaler, smoother: ExponentialSmoother) -> Self {
        Self { scaler, smoother }
    }

    /// returns None (and leaves all state alone) when the frame has no centroid
    pub fn update<I>(&mut self, bins: I) -> Option<f64>
    where
        I: IntoIterator,
        I::Item: Borrow<f64>,
    {
        let c = centroid(bins)?;

        let scaled = self.scaler.update_and_scale(c);

        let smoothed = self.smoother.smooth(scaled);

        trace!("centroid {} -> {} -> {}", c, scaled, smoothed);

        Some(smoothed)
    }

    /// the last smoothed output
    pub fn last(&self) -> Option<f64> {
        self.smoother.previous()
    }

    pub fn scaler(&self) -> &AdaptiveScaler {
        &self.scaler
    }

    pub fn smoother(&self) -> &ExponentialSmoother {
        &self.smoother
    }
}
