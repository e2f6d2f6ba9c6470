//! Stereo-linked peak limiter kernel
//!
//! A feed-forward limiter with independent attack, hold and release timing,
//! a power-law compression curve and makeup gain. Both channels share one
//! envelope, so they always receive identical gain and the stereo image
//! never shifts.
//!
//! # Algorithm
//!
//! For every frame:
//!
//! 1. **Detect**: the stereo peak `max(|L|, |R|)` drives a peak envelope that
//!    jumps up instantly and decays exponentially (four times faster than
//!    the release time constant).
//! 2. **Transfer**: above threshold the target gain follows
//!    `envelope^ratio_exp * gain_scale`, below it the target is the makeup
//!    gain. `gain_scale` is chosen so both branches meet at the threshold.
//! 3. **Smooth**: when the target asks for more reduction than is currently
//!    applied the gain moves toward it with the attack coefficient and the
//!    hold counter is re-armed. Otherwise the gain is frozen while the hold
//!    counter runs down, then recovers with the release coefficient.
//! 4. **Apply**: both channels are scaled by the smoothed gain, which is also
//!    returned for metering.
//!
//! # Parameter order
//!
//! Attack, hold and release are converted to per-sample coefficients using
//! the sample rate current at the time the setter runs. Call
//! [`Limiter::set_sample_rate`] first, and re-run the three time setters after
//! every sample-rate change. [`LimiterParams::apply`](crate::config::LimiterParams::apply)
//! does this in the right order.
//!
//! # Real-time behaviour
//!
//! The setters and `process_*` methods never allocate, lock, log or fail.
//! Out-of-range parameters are not rejected; they produce odd (possibly
//! NaN) coefficients instead. Validation is the host's job, see
//! [`LimiterParams::validate`](crate::config::LimiterParams::validate).

use crate::config::LimiterParams;
use crate::types::{
    db_to_gain, gain_to_db, stereo_peak, Sample, StereoBuffer, StereoSample, SAMPLE_RATE,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Smallest time constant (in samples) fed into the coefficient math.
/// Anything at or below this yields a coefficient of exactly 0 (instant).
const MIN_TIME_SAMPLES: Sample = 1.0e-6;

/// The peak envelope decays this many times faster than gain-reduction release.
const ENVELOPE_DECAY_SPEEDUP: Sample = 4.0;

/// Convert a time in milliseconds to a (fractional) sample count.
#[inline]
fn ms_to_samples(ms: Sample, sample_rate: Sample) -> Sample {
    ms * (sample_rate * 0.001)
}

/// Largest coefficient below 1.0. Longer time constants than f32 can
/// resolve are held here so the smoother never stops moving.
const MAX_COEFF: Sample = 1.0 - Sample::EPSILON / 2.0;

/// One-pole smoothing coefficient `exp(-1 / samples)`, clamped so that zero
/// (or negative, or NaN) time constants give an instantaneous response.
///
/// Evaluated in f64: for time constants beyond a few million samples the
/// f32 result would round to exactly 1.0.
#[inline]
fn one_pole_coeff(time_samples: Sample) -> Sample {
    let samples = f64::from(time_samples.max(MIN_TIME_SAMPLES));
    ((-1.0 / samples).exp() as Sample).min(MAX_COEFF)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Limiter
// ═══════════════════════════════════════════════════════════════════════════════

/// Stereo-linked peak limiter with attack/hold/release smoothing.
///
/// A freshly constructed limiter is a pass-through: 0 dB threshold, ratio 1,
/// zero attack/hold/release and unity makeup gain.
#[derive(Debug, Clone)]
pub struct Limiter {
    /// Host sample rate in Hz
    sample_rate: Sample,

    // — Transfer curve ——————————————————————————————————————————————————————

    /// Threshold in linear amplitude
    threshold: Sample,
    /// Curve exponent: `1/ratio - 1` (0 = no compression, -1 = brick wall)
    ratio_exp: Sample,
    /// `output_gain * threshold^(-ratio_exp)`, anchors the curve at the threshold
    gain_scale: Sample,
    /// Makeup gain in linear amplitude
    output_gain: Sample,

    // — Timing ——————————————————————————————————————————————————————————————

    attack_coeff: Sample,
    release_coeff: Sample,
    /// Decay coefficient of the peak envelope, derived from the release time
    envelope_decay_coeff: Sample,
    /// Samples to freeze gain reduction after the last attack step
    hold_samples: u32,

    // — Running state ———————————————————————————————————————————————————————

    /// Remaining hold samples for the current peak event
    hold_counter: u32,
    /// Peak detector output (always >= 0)
    envelope: Sample,
    /// Currently applied gain, also the metering value
    gain_reduction: Sample,
}

impl Limiter {
    /// Create a pass-through limiter at the default sample rate.
    pub fn new() -> Self {
        Self {
            sample_rate: SAMPLE_RATE as Sample,
            threshold: 1.0,
            ratio_exp: 0.0,
            gain_scale: 1.0,
            output_gain: 1.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope_decay_coeff: 0.0,
            hold_samples: 0,
            hold_counter: 0,
            envelope: 0.0,
            gain_reduction: 1.0,
        }
    }

    /// Create a limiter configured from a parameter set.
    ///
    /// The sample rate is applied before the time-based parameters, so the
    /// resulting coefficients are always consistent.
    pub fn with_params(sample_rate: Sample, params: &LimiterParams) -> Self {
        let mut limiter = Self::new();
        params.apply(&mut limiter, sample_rate);
        limiter
    }

    // ───────────────────────────────────────────────────────────────────────
    // Parameter setters
    // ───────────────────────────────────────────────────────────────────────

    /// Set the host sample rate in Hz.
    ///
    /// Does not touch coefficients already derived from attack, hold or
    /// release. Call those setters again after changing the rate.
    pub fn set_sample_rate(&mut self, rate: Sample) {
        self.sample_rate = rate;
    }

    /// Set the threshold in dBFS.
    pub fn set_threshold(&mut self, threshold_db: Sample) {
        self.threshold = db_to_gain(threshold_db);
        self.update_gain_scale();
    }

    /// Set the compression ratio (1 = none, large values approach a brick wall).
    pub fn set_ratio(&mut self, ratio: Sample) {
        self.ratio_exp = ratio.recip() - 1.0;
        self.update_gain_scale();
    }

    /// Set the attack time in milliseconds (0 = instant).
    pub fn set_attack(&mut self, attack_ms: Sample) {
        self.attack_coeff = one_pole_coeff(ms_to_samples(attack_ms, self.sample_rate));
    }

    /// Set the hold time in milliseconds, rounded to whole samples.
    pub fn set_hold(&mut self, hold_ms: Sample) {
        // `as` saturates: negative and NaN become 0
        self.hold_samples = ms_to_samples(hold_ms, self.sample_rate).round() as u32;
    }

    /// Set the release time in milliseconds (0 = instant).
    ///
    /// Also sets the peak envelope's decay, which runs at a quarter of the
    /// release time constant.
    pub fn set_release(&mut self, release_ms: Sample) {
        let samples = ms_to_samples(release_ms, self.sample_rate).max(MIN_TIME_SAMPLES);
        self.release_coeff = one_pole_coeff(samples);
        self.envelope_decay_coeff = one_pole_coeff(samples / ENVELOPE_DECAY_SPEEDUP);
    }

    /// Set the makeup gain in dB.
    pub fn set_makeup_gain(&mut self, gain_db: Sample) {
        self.output_gain = db_to_gain(gain_db);
        self.update_gain_scale();
    }

    fn update_gain_scale(&mut self) {
        self.gain_scale = self.output_gain * self.threshold.powf(-self.ratio_exp);
    }

    /// Clear envelope, gain reduction and any pending hold.
    ///
    /// Configuration is kept. Use after seeks or other stream discontinuities.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
        self.gain_reduction = 1.0;
        self.hold_counter = 0;
    }

    // ───────────────────────────────────────────────────────────────────────
    // Processing
    // ───────────────────────────────────────────────────────────────────────

    /// Limit one stereo frame in place and return the applied gain.
    #[inline]
    pub fn process_sample(&mut self, left: &mut Sample, right: &mut Sample) -> Sample {
        let peak = stereo_peak(*left, *right);

        if peak >= self.envelope {
            self.envelope = peak;
        } else {
            self.envelope = peak + self.envelope_decay_coeff * (self.envelope - peak);
        }

        let target = if self.envelope > self.threshold {
            self.compression_curve(self.envelope)
        } else {
            self.output_gain
        };

        if target < self.gain_reduction {
            self.hold_counter = self.hold_samples;
            self.gain_reduction = target + self.attack_coeff * (self.gain_reduction - target);
        } else if self.hold_counter > 0 {
            self.hold_counter -= 1;
        } else {
            self.gain_reduction = target + self.release_coeff * (self.gain_reduction - target);
        }

        *left *= self.gain_reduction;
        *right *= self.gain_reduction;
        self.gain_reduction
    }

    /// Limit one [`StereoSample`] in place and return the applied gain.
    #[inline]
    pub fn process_frame(&mut self, frame: &mut StereoSample) -> Sample {
        let StereoSample { left, right } = frame;
        self.process_sample(left, right)
    }

    /// Limit a stereo buffer in place.
    ///
    /// Returns the lowest gain applied anywhere in the block, suitable for a
    /// block-rate gain-reduction meter. An empty buffer reports the current
    /// gain.
    pub fn process(&mut self, buffer: &mut StereoBuffer) -> Sample {
        self.process_frames(buffer.as_mut_slice())
    }

    /// Limit an interleaved `[L, R, L, R, ...]` buffer in place.
    ///
    /// A trailing unpaired sample is left untouched. Returns the lowest gain
    /// applied, like [`Limiter::process`].
    pub fn process_interleaved(&mut self, interleaved: &mut [Sample]) -> Sample {
        let paired = interleaved.len() & !1;
        let frames: &mut [StereoSample] = bytemuck::cast_slice_mut(&mut interleaved[..paired]);
        self.process_frames(frames)
    }

    fn process_frames(&mut self, frames: &mut [StereoSample]) -> Sample {
        if frames.is_empty() {
            return self.gain_reduction;
        }
        frames
            .iter_mut()
            .map(|frame| self.process_frame(frame))
            .fold(Sample::INFINITY, Sample::min)
    }

    /// Power-law part of the transfer curve, valid above the threshold.
    #[inline]
    fn compression_curve(&self, envelope: Sample) -> Sample {
        envelope.powf(self.ratio_exp) * self.gain_scale
    }

    // ───────────────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────────────

    pub fn sample_rate(&self) -> Sample {
        self.sample_rate
    }

    /// Threshold in linear amplitude
    pub fn threshold(&self) -> Sample {
        self.threshold
    }

    /// Makeup gain in linear amplitude (upper bound of the metering value)
    pub fn output_gain(&self) -> Sample {
        self.output_gain
    }

    pub fn hold_samples(&self) -> u32 {
        self.hold_samples
    }

    /// Current peak envelope
    pub fn envelope(&self) -> Sample {
        self.envelope
    }

    /// Gain applied to the most recent frame
    pub fn gain_reduction(&self) -> Sample {
        self.gain_reduction
    }

    /// Gain applied to the most recent frame, in dB
    pub fn gain_reduction_db(&self) -> Sample {
        gain_to_db(self.gain_reduction)
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
