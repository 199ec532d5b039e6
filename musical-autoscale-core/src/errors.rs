use thiserror::Error;

/// everything that can go wrong is a bad number going in. the scaling itself never fails
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScaleError {
    #[error("sample is not finite: {0}")]
    NonFiniteSample(f64),
    #[error("initial {name} is not finite: {value}")]
    NonFiniteInitial { name: &'static str, value: f64 },
    #[error("max factor must be finite and positive: {0}")]
    InvalidMaxFactor(f64),
    #[error("initial factor candidate must be in (0, max_factor]: {0}")]
    InvalidFactorCandidate(f64),
    #[error("min weight must be positive and at most the final min weight: {min} > {last}")]
    InvalidMinWeight { min: u32, last: u32 },
    #[error("min weight increase base must be at least 1: {0}")]
    InvalidMinWeightBase(u32),
    #[error("initial offset {offset} is above the offset candidate seed {candidate}")]
    OffsetAboveCandidate { offset: f64, candidate: f64 },
    #[error("smoothing weight must be in (0, 1]: {0}")]
    InvalidSmoothingWeight(f64),
}

pub type ScaleResult<T> = Result<T, ScaleError>;
