//! User-facing limiter parameters
//!
//! Values in the units a host UI uses (dB, ms, ratio). Converting
//! them to per-sample coefficients is the kernel's job; this type only makes
//! sure the setters run in an order that keeps those coefficients valid.

use serde::{Deserialize, Serialize};

use super::error::{ParamError, ParamResult};
use crate::limiter::Limiter;

/// Limiter parameter set
///
/// Defaults describe a pass-through limiter: 0 dB threshold, ratio 1:1,
/// zero attack/hold/release and no makeup gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterParams {
    /// Threshold in dBFS. Peaks above this level are reduced.
    pub threshold_db: f32,

    /// Compression ratio above threshold (1.0 = none, 20+ behaves like a brick wall)
    pub ratio: f32,

    /// Time for gain reduction to engage, in ms (0 = instant)
    pub attack_ms: f32,

    /// Time gain reduction is frozen after a peak before release, in ms
    pub hold_ms: f32,

    /// Time for gain reduction to recover, in ms (0 = instant).
    /// Also sets how fast the peak detector decays.
    pub release_ms: f32,

    /// Makeup gain in dB, applied whether or not the limiter is reducing
    pub makeup_db: f32,
}

impl Default for LimiterParams {
    fn default() -> Self {
        Self {
            threshold_db: 0.0,
            ratio: 1.0,
            attack_ms: 0.0,
            hold_ms: 0.0,
            release_ms: 0.0,
            makeup_db: 0.0,
        }
    }
}

impl LimiterParams {
    /// Check the parameter set before handing it to a limiter.
    ///
    /// The kernel accepts anything and silently produces odd coefficients
    /// for nonsense input, so hosts that take values from users or files
    /// should call this first. Rejections are logged as warnings.
    pub fn validate(&self, sample_rate: f32) -> ParamResult<()> {
        let result = self.check(sample_rate);
        if let Err(e) = &result {
            log::warn!("LimiterParams::validate: rejected parameters: {}", e);
        }
        result
    }

    fn check(&self, sample_rate: f32) -> ParamResult<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ParamError::InvalidSampleRate(sample_rate));
        }

        let values = [
            ("threshold_db", self.threshold_db),
            ("ratio", self.ratio),
            ("attack_ms", self.attack_ms),
            ("hold_ms", self.hold_ms),
            ("release_ms", self.release_ms),
            ("makeup_db", self.makeup_db),
        ];
        if let Some(&(name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ParamError::NonFinite { name, value });
        }

        if self.ratio < 1.0 {
            return Err(ParamError::RatioBelowOne(self.ratio));
        }

        let times = [
            ("attack_ms", self.attack_ms),
            ("hold_ms", self.hold_ms),
            ("release_ms", self.release_ms),
        ];
        if let Some(&(name, value)) = times.iter().find(|(_, v)| *v < 0.0) {
            return Err(ParamError::NegativeTime { name, value });
        }

        Ok(())
    }

    /// Push every parameter into `limiter`.
    ///
    /// The sample rate goes in first so attack, hold and release are derived
    /// against the right rate. Also call this again when the host's sample
    /// rate changes. Logs, so keep it off the audio thread.
    pub fn apply(&self, limiter: &mut Limiter, sample_rate: f32) {
        log::debug!(
            "LimiterParams::apply: {} Hz, threshold {} dB, ratio {}:1, attack {} ms, hold {} ms, release {} ms, makeup {} dB",
            sample_rate,
            self.threshold_db,
            self.ratio,
            self.attack_ms,
            self.hold_ms,
            self.release_ms,
            self.makeup_db
        );

        limiter.set_sample_rate(sample_rate);
        limiter.set_threshold(self.threshold_db);
        limiter.set_ratio(self.ratio);
        limiter.set_makeup_gain(self.makeup_db);
        limiter.set_attack(self.attack_ms);
        limiter.set_hold(self.hold_ms);
        limiter.set_release(self.release_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mastering() -> LimiterParams {
        LimiterParams {
            threshold_db: -1.0,
            ratio: 20.0,
            attack_ms: 1.0,
            hold_ms: 10.0,
            release_ms: 100.0,
            makeup_db: 0.0,
        }
    }

    #[test]
    fn test_default_values() {
        let params = LimiterParams::default();
        assert_eq!(params.threshold_db, 0.0);
        assert_eq!(params.ratio, 1.0);
        assert_eq!(params.attack_ms, 0.0);
        assert_eq!(params.hold_ms, 0.0);
        assert_eq!(params.release_ms, 0.0);
        assert_eq!(params.makeup_db, 0.0);
        assert_eq!(params.validate(48000.0), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_sample_rate() {
        let params = mastering();
        assert_eq!(params.validate(0.0), Err(ParamError::InvalidSampleRate(0.0)));
        assert_eq!(params.validate(-44100.0), Err(ParamError::InvalidSampleRate(-44100.0)));
        assert!(matches!(
            params.validate(f32::INFINITY),
            Err(ParamError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let params = LimiterParams {
            release_ms: f32::NAN,
            ..mastering()
        };
        assert!(matches!(
            params.validate(48000.0),
            Err(ParamError::NonFinite { name: "release_ms", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_expanding_ratio() {
        let params = LimiterParams {
            ratio: 0.5,
            ..mastering()
        };
        assert_eq!(params.validate(48000.0), Err(ParamError::RatioBelowOne(0.5)));
    }

    #[test]
    fn test_validate_rejects_negative_times() {
        let params = LimiterParams {
            hold_ms: -2.0,
            ..mastering()
        };
        assert_eq!(
            params.validate(48000.0),
            Err(ParamError::NegativeTime { name: "hold_ms", value: -2.0 })
        );
        assert_eq!(
            params.validate(48000.0).unwrap_err().to_string(),
            "Parameter 'hold_ms' must not be negative: -2 ms"
        );
    }

    #[test]
    fn test_apply_sets_rate_before_time_parameters() {
        let params = mastering();

        // Host calls the setters in the wrong order: hold is derived at the old rate
        let mut wrong_order = Limiter::new();
        wrong_order.set_hold(params.hold_ms);
        wrong_order.set_sample_rate(96000.0);
        assert_eq!(wrong_order.hold_samples(), 480);

        let mut limiter = Limiter::new();
        params.apply(&mut limiter, 96000.0);
        assert_eq!(limiter.sample_rate(), 96000.0);
        assert_eq!(limiter.hold_samples(), 960);
        assert!((limiter.threshold() - 0.891_25).abs() < 1e-4);
        assert_eq!(limiter.output_gain(), 1.0);
    }

    #[test]
    fn test_reapply_after_rate_change() {
        let params = mastering();
        let mut limiter = Limiter::with_params(44100.0, &params);
        assert_eq!(limiter.hold_samples(), 441);

        params.apply(&mut limiter, 88200.0);
        assert_eq!(limiter.hold_samples(), 882);
    }

    #[test]
    fn test_default_params_build_pass_through() {
        let mut limiter = Limiter::with_params(48000.0, &LimiterParams::default());
        for &(l, r) in &[(0.3, -0.3), (1.7, 0.2), (-0.9, 2.5)] {
            let (mut ol, mut or) = (l, r);
            assert_eq!(limiter.process_sample(&mut ol, &mut or), 1.0);
            assert_eq!((ol, or), (l, r));
        }
    }
}
