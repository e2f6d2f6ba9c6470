//! Mesh Limiter - Stereo-linked peak limiter kernel
//!
//! A real-time limiter driven once per stereo frame by a host audio engine,
//! plus the parameter handling and validation that sits next to it on the
//! control side.

pub mod config;
pub mod limiter;
pub mod types;

pub use config::{LimiterParams, ParamError};
pub use limiter::Limiter;
pub use types::*;
