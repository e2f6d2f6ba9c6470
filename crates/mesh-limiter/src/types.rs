//! Common types for the limiter
//!
//! Stereo frame and buffer types shared by the kernel and its hosts, plus the
//! decibel conversions used by the parameter setters and meters.

/// Default sample rate (48kHz) assumed until the host calls `set_sample_rate`
pub const SAMPLE_RATE: u32 = 48000;

/// Audio sample type (32-bit float throughout the processing path)
pub type Sample = f32;

/// Floor reported by [`gain_to_db`] for silent or non-positive gains
pub const MIN_DB: Sample = -120.0;

/// Convert decibels to a linear amplitude factor (`10^(db/20)`)
#[inline]
pub fn db_to_gain(db: Sample) -> Sample {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear amplitude factor to decibels, floored at [`MIN_DB`]
#[inline]
pub fn gain_to_db(gain: Sample) -> Sample {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MIN_DB)
    } else {
        MIN_DB
    }
}

/// Stereo-linked detector input: the louder of the two channels
#[inline]
pub fn stereo_peak(left: Sample, right: Sample) -> Sample {
    left.abs().max(right.abs())
}

/// A single stereo frame (left and right channels)
///
/// Uses `#[repr(C)]` to ensure predictable memory layout: [left, right].
/// This lets an interleaved `&mut [f32]` be viewed as `&mut [StereoSample]`
/// with bytemuck, without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    /// Create a new stereo sample
    #[inline]
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }
}

/// A buffer of stereo frames for block processing
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer {
    samples: Vec<StereoSample>,
}

impl StereoBuffer {
    /// Create a buffer from an existing Vec of StereoSamples
    pub fn from_vec(samples: Vec<StereoSample>) -> Self {
        Self { samples }
    }

    /// Get the number of stereo samples in the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get a slice of the samples
    #[inline]
    pub fn as_slice(&self) -> &[StereoSample] {
        &self.samples
    }

    /// Get a mutable slice of the samples
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [StereoSample] {
        &mut self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_peak_takes_louder_channel() {
        assert_eq!(stereo_peak(0.25, -0.75), 0.75);
        assert_eq!(stereo_peak(-1.5, 0.5), 1.5);
        assert_eq!(stereo_peak(0.0, -0.0), 0.0);
    }

    #[test]
    fn test_interleaved_cast_matches_frames() {
        let mut interleaved: [Sample; 4] = [0.1, 0.2, 0.3, 0.4];
        let frames: &mut [StereoSample] = bytemuck::cast_slice_mut(&mut interleaved);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], StereoSample::new(0.3, 0.4));

        frames[0].right = -0.9;
        assert_eq!(interleaved, [0.1, -0.9, 0.3, 0.4]);
    }

    #[test]
    fn test_buffer_views() {
        let mut buf = StereoBuffer::from_vec(vec![StereoSample::new(0.5, -0.5); 3]);
        assert_eq!(buf.len(), 3);
        assert!(!buf.is_empty());
        buf.as_mut_slice()[2].left = 0.0;
        assert_eq!(buf.as_slice()[2], StereoSample::new(0.0, -0.5));
        assert!(StereoBuffer::default().is_empty());
    }

    #[test]
    fn test_db_conversions() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-6.0) - 0.501_187).abs() < 1e-5);
        assert!((db_to_gain(6.0) - 1.995_262).abs() < 1e-5);
        assert!((gain_to_db(0.5) - (-6.020_6)).abs() < 1e-3);
        assert_eq!(gain_to_db(0.0), MIN_DB);
        assert_eq!(gain_to_db(-1.0), MIN_DB);
        assert_eq!(gain_to_db(1e-12), MIN_DB);
    }
}
