//! Limiter configuration
//!
//! The kernel itself never validates anything. This module provides the
//! control-side pieces a host needs around it:
//!
//! - [`LimiterParams`]: user-facing parameter set (dB, ms, ratio)
//! - Validation of a parameter set before it reaches the audio thread
//!
//! # Usage
//!
//! ```ignore
//! use mesh_limiter::config::LimiterParams;
//!
//! params.validate(sample_rate)?;
//! params.apply(&mut limiter, sample_rate);
//! ```

mod error;
mod params;

pub use error::{ParamError, ParamResult};
pub use params::LimiterParams;
