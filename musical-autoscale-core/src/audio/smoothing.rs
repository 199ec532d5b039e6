use crate::errors::{ScaleError, ScaleResult};

/// `weight * current + (1 - weight) * previous`
///
/// The first value passes straight through so there is no lag ramping up from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExponentialSmoother {
    weight: f64,
    previous: Option<f64>,
}

impl Default for ExponentialSmoother {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl ExponentialSmoother {
    pub const fn new(weight: f64) -> Self {
        Self {
            weight,
            previous: None,
        }
    }

    pub fn try_new(weight: f64) -> ScaleResult<Self> {
        if weight.is_nan() || weight <= 0.0 || weight > 1.0 {
            return Err(ScaleError::InvalidSmoothingWeight(weight));
        }

        Ok(Self::new(weight))
    }

    pub fn smooth(&mut self, current: f64) -> f64 {
        let smoothed = match self.previous {
            Some(previous) => self.weight * current + (1.0 - self.weight) * previous,
            None => current,
        };

        self.previous = Some(smoothed);

        smoothed
    }

    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
