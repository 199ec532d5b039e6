use crate::errors::{ScaleError, ScaleResult};

/// Tuning for an [`AdaptiveScaler`](crate::audio::AdaptiveScaler).
///
/// The candidate seeds are purposefully far off so that the first samples immediately correct them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoScaleConfig {
    /// starting lower bound candidate. should be above anything the stream will produce
    pub offset_candidate: f64,
    /// starting scale candidate
    pub factor_candidate: f64,
    /// ceiling for both the confirmed and the candidate factor
    pub max_factor: f64,
    /// samples a candidate needs to hold before it gets promoted. grows over time
    pub min_weight: u32,
    /// min_weight stops growing here
    pub final_min_weight: u32,
    /// min_weight is multiplied by this every time the factor is refreshed
    pub min_weight_inc_base: u32,
}

impl Default for AutoScaleConfig {
    fn default() -> Self {
        Self {
            offset_candidate: 1000.0,
            factor_candidate: 0.1,
            max_factor: 0.1,
            min_weight: 5,
            final_min_weight: 500,
            min_weight_inc_base: 2,
        }
    }
}

impl AutoScaleConfig {
    pub fn validate(&self) -> ScaleResult<()> {
        if !self.offset_candidate.is_finite() {
            return Err(ScaleError::NonFiniteInitial {
                name: "offset candidate",
                value: self.offset_candidate,
            });
        }

        if !self.max_factor.is_finite() || self.max_factor <= 0.0 {
            return Err(ScaleError::InvalidMaxFactor(self.max_factor));
        }

        if self.factor_candidate.is_nan()
            || self.factor_candidate <= 0.0
            || self.factor_candidate > self.max_factor
        {
            return Err(ScaleError::InvalidFactorCandidate(self.factor_candidate));
        }

        if self.min_weight == 0 || self.min_weight > self.final_min_weight {
            return Err(ScaleError::InvalidMinWeight {
                min: self.min_weight,
                last: self.final_min_weight,
            });
        }

        if self.min_weight_inc_base == 0 {
            return Err(ScaleError::InvalidMinWeightBase(self.min_weight_inc_base));
        }

        Ok(())
    }
}

/// Everything a [`ScopeSession`](crate::ScopeSession) needs to build its two scalers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionConfig {
    pub waveform_offset: f64,
    /// waveform magnitudes are squared bytes, so they start out large
    pub waveform_factor: f64,
    pub centroid_offset: f64,
    pub centroid_factor: f64,
    /// how much of the newest centroid goes into the smoothed output
    pub smoothing_weight: f64,
    pub scale: AutoScaleConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            waveform_offset: 0.0,
            waveform_factor: 1.0 / 64.0,
            centroid_offset: 0.0,
            centroid_factor: 1.0,
            smoothing_weight: 0.1,
            scale: AutoScaleConfig::default(),
        }
    }
}
