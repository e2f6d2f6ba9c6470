//! Parameter validation error types

use thiserror::Error;

/// Problems found when validating a [`LimiterParams`](super::LimiterParams)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Sample rate is zero, negative or not finite
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// A parameter is NaN or infinite
    #[error("Parameter '{name}' is not finite: {value}")]
    NonFinite { name: &'static str, value: f32 },

    /// Ratio below 1:1 would expand instead of limit
    #[error("Ratio must be at least 1.0, got {0}")]
    RatioBelowOne(f32),

    /// Attack, hold or release time is negative
    #[error("Parameter '{name}' must not be negative: {value} ms")]
    NegativeTime { name: &'static str, value: f32 },
}

/// Result type for parameter validation
pub type ParamResult<T> = Result<T, ParamError>;
