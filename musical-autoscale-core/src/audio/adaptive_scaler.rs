use crate::config::AutoScaleConfig;
use crate::errors::{ScaleError, ScaleResult};
use crate::logging::{debug, trace, warn};

/// Online range normalization for a drifting stream.
///
/// Keeps a confirmed `offset`/`factor` pair that the output is computed with, and a candidate pair that reacts
/// to new extremes immediately. A candidate only replaces the confirmed value after it has held for `min_weight`
/// samples. `min_weight` grows every time the factor is refreshed, so a long-running scaler gets harder to move.
///
/// One of these per logical stream! Feeding two unrelated streams into one scaler corrupts both estimates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdaptiveScaler {
    offset: f64,
    offset_candidate: f64,
    offset_weight: u32,
    factor: f64,
    factor_candidate: f64,
    factor_weight: u32,
    min_weight: u32,
    final_min_weight: u32,
    min_weight_inc_base: u32,
    max_factor: f64,
    last_output: f64,
}

impl Default for AdaptiveScaler {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl AdaptiveScaler {
    /// Build a scaler with the default tuning.
    ///
    /// `initial_factor` may be above the default `max_factor`. It gets clamped on the first update.
    /// An `initial_offset` above the default offset candidate seeds the candidate instead.
    pub fn new(initial_offset: f64, initial_factor: f64) -> Self {
        let config = AutoScaleConfig::default();

        Self::from_parts(initial_offset, initial_factor, &config)
    }

    pub fn try_new(
        initial_offset: f64,
        initial_factor: f64,
        config: AutoScaleConfig,
    ) -> ScaleResult<Self> {
        config.validate()?;

        if !initial_offset.is_finite() {
            return Err(ScaleError::NonFiniteInitial {
                name: "offset",
                value: initial_offset,
            });
        }

        if !initial_factor.is_finite() {
            return Err(ScaleError::NonFiniteInitial {
                name: "factor",
                value: initial_factor,
            });
        }

        if initial_offset > config.offset_candidate {
            return Err(ScaleError::OffsetAboveCandidate {
                offset: initial_offset,
                candidate: config.offset_candidate,
            });
        }

        Ok(Self::from_parts(initial_offset, initial_factor, &config))
    }

    fn from_parts(initial_offset: f64, initial_factor: f64, config: &AutoScaleConfig) -> Self {
        Self {
            offset: initial_offset,
            // the candidate can never start below the confirmed bound
            offset_candidate: config.offset_candidate.max(initial_offset),
            offset_weight: 0,
            factor: initial_factor,
            factor_candidate: config.factor_candidate,
            factor_weight: 0,
            min_weight: config.min_weight,
            final_min_weight: config.final_min_weight,
            min_weight_inc_base: config.min_weight_inc_base,
            max_factor: config.max_factor,
            last_output: 0.0,
        }
    }

    /// Update the estimates with `value` and return it normalized.
    ///
    /// Non-finite values are skipped. The state is left alone and the previous output is returned.
    pub fn update_and_scale(&mut self, value: f64) -> f64 {
        match self.try_update_and_scale(value) {
            Ok(x) => x,
            Err(err) => {
                warn!("skipping sample: {}", err);
                self.last_output
            }
        }
    }

    /// Same as [`Self::update_and_scale`], but non-finite values are an error instead of being skipped.
    pub fn try_update_and_scale(&mut self, value: f64) -> ScaleResult<f64> {
        if !value.is_finite() {
            return Err(ScaleError::NonFiniteSample(value));
        }

        self.track_offset(value);
        self.check_candidate_scale(value);
        self.refresh_factor(value);
        self.clamp_factors();

        let scaled = self.scale(value);

        trace!("{} -> {}", value, scaled);

        self.last_output = scaled;

        Ok(scaled)
    }

    /// Normalize `value` with the confirmed estimates. Does not update anything.
    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        self.factor * (value - self.offset)
    }

    fn track_offset(&mut self, value: f64) {
        if value < self.offset_candidate {
            // a new low. the candidate follows it immediately
            let diff_out = self.offset_candidate - value;
            self.offset_candidate = value;
            self.offset_weight = self.offset_weight.saturating_add(1);
            self.factor_candidate /= 1.0 + self.factor_candidate * diff_out;

            if value < self.offset {
                // below even the confirmed bound. there's no waiting for this one
                self.factor /= 1.0 + self.factor * (self.offset - value);
                self.offset = self.offset_candidate;
            }
        } else if self.offset_weight >= self.min_weight {
            // the candidate held long enough. the bound moves up to it
            self.factor /= 1.0 - self.factor * (self.offset_candidate - self.offset);
            self.offset = self.offset_candidate;

            let diff_in = value - self.offset_candidate;
            self.offset_candidate = value;
            self.offset_weight = 1;
            self.factor_candidate /= 1.0 - self.factor_candidate * diff_in;

            debug!("offset promoted to {}", self.offset);
        } else {
            self.offset_weight = self.offset_weight.saturating_add(1);
        }
    }

    fn check_candidate_scale(&mut self, value: f64) {
        let candidate_scaled = self.factor_candidate * (value - self.offset);

        if candidate_scaled > 1.0 {
            // map `value` to exactly 1
            self.factor_candidate /= candidate_scaled;

            if self.scale(value) > 1.0 {
                self.factor = self.factor_candidate;
            }
        }
    }

    fn refresh_factor(&mut self, value: f64) {
        if self.factor_weight >= self.min_weight {
            self.factor = self.factor_candidate;
            // value == offset divides by zero. the clamp catches the infinity
            self.factor_candidate = 1.0 / (value - self.offset);
            self.factor_weight = 1;
            self.min_weight = self
                .min_weight
                .saturating_mul(self.min_weight_inc_base)
                .min(self.final_min_weight);

            debug!(
                "factor refreshed to {}. min weight = {}",
                self.factor, self.min_weight
            );
        } else {
            self.factor_weight = self.factor_weight.saturating_add(1);
        }
    }

    /// zero, negative, NaN, and anything over the ceiling all become the ceiling
    fn clamp_factors(&mut self) {
        if self.factor_candidate.is_nan()
            || self.factor_candidate <= 0.0
            || self.factor_candidate > self.max_factor
        {
            self.factor_candidate = self.max_factor;
        }

        if self.factor.is_nan() || self.factor <= 0.0 || self.factor > self.max_factor {
            self.factor = self.max_factor;
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn offset_candidate(&self) -> f64 {
        self.offset_candidate
    }

    pub fn offset_weight(&self) -> u32 {
        self.offset_weight
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn factor_candidate(&self) -> f64 {
        self.factor_candidate
    }

    pub fn factor_weight(&self) -> u32 {
        self.factor_weight
    }

    pub fn min_weight(&self) -> u32 {
        self.min_weight
    }

    pub fn final_min_weight(&self) -> u32 {
        self.final_min_weight
    }

    pub fn max_factor(&self) -> f64 {
        self.max_factor
    }

    /// the value returned by the last successful update. 0 before any update
    pub fn last_output(&self) -> f64 {
        self.last_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::info;

    /// a stream that wobbles between roughly 12 and 28
    fn wobble(i: usize) -> f64 {
        let i = i as f64;

        20.0 + 5.0 * (i * 0.7).sin() + 3.0 * (i * 1.3).sin()
    }

    /// cheap deterministic noise so the tests don't need a rng crate
    fn noise(state: &mut u64) -> f64 {
        *state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);

        ((*state >> 11) as f64) / ((1u64 << 53) as f64)
    }

    fn assert_invariants(x: &AdaptiveScaler) {
        assert!(
            x.offset() <= x.offset_candidate(),
            "offset {} > candidate {}",
            x.offset(),
            x.offset_candidate()
        );
        assert!(x.factor() > 0.0 && x.factor() <= x.max_factor());
        assert!(x.factor_candidate() > 0.0 && x.factor_candidate() <= x.max_factor());
        assert!(x.min_weight() > 0 && x.min_weight() <= x.final_min_weight());
    }

    /// a fresh scaler hasn't clamped its factor yet, so only the bounds are checked
    fn assert_invariants_before_update(x: &AdaptiveScaler) {
        assert!(x.offset() <= x.offset_candidate());
        assert!(x.min_weight() > 0 && x.min_weight() <= x.final_min_weight());
    }

    #[test]
    fn test_first_updates() {
        let mut x = AdaptiveScaler::new(0.0, 1.0);

        // unclamped this would be 1 * (10 - 0) = 10. the factor of 1 is over the default max of 0.1 though
        let first = x.update_and_scale(10.0);
        assert_eq!(x.factor(), 0.1);
        assert!((first - 1.0).abs() < 1e-12);
        assert_eq!(x.offset_candidate(), 10.0);
        assert_eq!(x.offset(), 0.0);

        let second = x.update_and_scale(5.0);
        assert_eq!(x.offset_candidate(), 5.0);
        assert_eq!(x.offset(), 0.0);
        assert!((second - 0.5).abs() < 1e-12);

        let third = x.update_and_scale(10.0);
        assert_eq!(x.offset_candidate(), 5.0);
        assert_eq!(x.offset_weight(), 3);
        assert!((third - 1.0).abs() < 1e-12);

        // 0.1 / (1 + 0.1 * 990) / (1 + 0.001 * 5)
        let expected_candidate = 0.001 / 1.005;
        assert!((x.factor_candidate() - expected_candidate).abs() < 1e-15);
    }

    #[test]
    fn test_value_below_offset_promotes_immediately() {
        let mut x = AdaptiveScaler::new(0.0, 0.05);

        x.update_and_scale(10.0);
        x.update_and_scale(-4.0);

        assert_eq!(x.offset(), -4.0);
        assert_eq!(x.offset_candidate(), -4.0);
        assert_invariants(&x);
    }

    #[test]
    fn test_outlier_between_offset_and_candidate() {
        let mut x = AdaptiveScaler::new(0.0, 1.0);

        // let the scaler settle on the wobble until the confirmed offset lags behind the candidate
        let mut found = false;
        for i in 0..4000 {
            x.update_and_scale(wobble(i));

            if i > 3000 && x.offset() < x.offset_candidate() - 1e-6 {
                found = true;
                break;
            }
        }
        assert!(found, "offset never lagged the candidate");

        let offset = x.offset();
        let outlier = (x.offset() + x.offset_candidate()) / 2.0;

        x.update_and_scale(outlier);

        assert_eq!(x.offset(), offset);
        assert_eq!(x.offset_candidate(), outlier);
        assert_invariants(&x);
    }

    #[test_log::test]
    fn test_increasing_stream_converges() {
        let mut x = AdaptiveScaler::default();

        let mut last = 0.0;
        for i in 0..=3000 {
            last = x.update_and_scale(i as f64);

            if i > 2000 {
                assert!((last - 1.0).abs() < 1e-6, "{} scaled to {}", i, last);
            }
        }

        info!("converged: {:?}", x);

        assert_eq!(x.min_weight(), x.final_min_weight());
        assert!((last - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_weight_grows_geometrically_then_stops() {
        let mut x = AdaptiveScaler::default();

        let mut seen = vec![x.min_weight()];
        for i in 0..5000 {
            let before = x.min_weight();

            x.update_and_scale(wobble(i));

            assert!(x.min_weight() >= before);
            assert!(x.min_weight() <= x.final_min_weight());

            if x.min_weight() != before {
                seen.push(x.min_weight());
            }
        }

        assert_eq!(seen, vec![5, 10, 20, 40, 80, 160, 320, 500]);
    }

    #[test]
    fn test_invariants_hold_on_noisy_streams() {
        let mut state = 7;

        for stream in 0..30 {
            let mut x = AdaptiveScaler::new(0.0, if stream % 2 == 0 { 1.0 } else { 1.0 / 64.0 });

            for i in 0..2000 {
                let value = match stream % 3 {
                    // uniform
                    0 => noise(&mut state) * 200.0 - 100.0,
                    // drifting with bursts
                    1 => {
                        let burst = if noise(&mut state) < 0.05 { 50.0 } else { 1.0 };
                        (noise(&mut state) - 0.5) * burst + i as f64 * 0.01
                    }
                    // squared bytes, like the waveform lanes
                    _ => {
                        let centered = noise(&mut state) * 255.0 - 128.0;
                        centered * centered
                    }
                };

                x.update_and_scale(value);

                assert_invariants(&x);
            }
        }
    }

    #[test]
    fn test_constant_stream_stays_finite() {
        let mut x = AdaptiveScaler::default();

        for _ in 0..2000 {
            let y = x.update_and_scale(3.0);

            assert!(y.is_finite());
            assert_invariants(&x);
        }
    }

    #[test]
    fn test_non_finite_is_skipped() {
        let mut x = AdaptiveScaler::default();

        let y = x.update_and_scale(10.0);
        let before = x.clone();

        assert_eq!(x.update_and_scale(f64::NAN), y);
        assert_eq!(x.update_and_scale(f64::INFINITY), y);
        assert_eq!(x, before);

        assert!(matches!(
            x.try_update_and_scale(f64::NEG_INFINITY),
            Err(ScaleError::NonFiniteSample(_))
        ));
        assert_eq!(x, before);
    }

    #[test]
    fn test_initial_offset_above_candidate_seed() {
        let mut x = AdaptiveScaler::new(2000.0, 1.0);

        assert_eq!(x.offset_candidate(), 2000.0);
        assert_invariants_before_update(&x);

        for value in [1500.0, 2500.0, 1800.0, 3000.0, 1200.0] {
            let y = x.update_and_scale(value);

            assert!(y >= 0.0, "{} scaled to {}", value, y);
            assert_invariants(&x);
        }

        assert_eq!(x.offset(), 1200.0);
    }

    #[test]
    fn test_weights_saturate() {
        let mut x = AdaptiveScaler::default();
        x.offset_candidate = 10.0;
        x.offset_weight = u32::MAX;

        // a new low bumps the weight. it must not wrap around to 0
        x.update_and_scale(9.0);

        assert_eq!(x.offset_candidate(), 9.0);
        assert_eq!(x.offset_weight(), u32::MAX);
        assert_invariants(&x);
    }

    #[test]
    fn test_try_new_rejects_bad_inputs() {
        let config = AutoScaleConfig::default();

        assert!(AdaptiveScaler::try_new(0.0, 1.0, config).is_ok());

        assert_eq!(
            AdaptiveScaler::try_new(2000.0, 1.0, config),
            Err(ScaleError::OffsetAboveCandidate {
                offset: 2000.0,
                candidate: 1000.0
            })
        );

        assert!(matches!(
            AdaptiveScaler::try_new(f64::NAN, 1.0, config),
            Err(ScaleError::NonFiniteInitial { name: "offset", .. })
        ));

        assert!(matches!(
            AdaptiveScaler::try_new(0.0, f64::INFINITY, config),
            Err(ScaleError::NonFiniteInitial { name: "factor", .. })
        ));

        let bad = AutoScaleConfig {
            max_factor: -1.0,
            ..config
        };
        assert_eq!(
            AdaptiveScaler::try_new(0.0, 1.0, bad),
            Err(ScaleError::InvalidMaxFactor(-1.0))
        );
    }

    #[test]
    fn test_custom_config() {
        let config = AutoScaleConfig {
            max_factor: 10.0,
            factor_candidate: 1.0,
            min_weight: 2,
            final_min_weight: 8,
            min_weight_inc_base: 3,
            ..Default::default()
        };

        let mut x = AdaptiveScaler::try_new(0.0, 1.0, config).unwrap();

        for i in 0..200 {
            x.update_and_scale((i % 7) as f64);

            assert_invariants(&x);
        }

        // 2 -> 6 -> 8
        assert_eq!(x.min_weight(), 8);
    }
}
