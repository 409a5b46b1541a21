//! Playback-rate change by resampling.
//!
//! A factor of 2.0 halves the frame count (faster, higher pitch); 0.5
//! doubles it. The stored sample rate is preserved — only the sample count
//! changes — using the same linear-interpolation policy as
//! [`resample_to_rate`](super::resample_to_rate).

use super::resample::interpolate_channel;
use super::sanitize_param;
use crate::buffer::SampleBuffer;

/// Slowest selectable playback factor.
pub const MIN_SPEED: f32 = 0.25;
/// Fastest selectable playback factor.
pub const MAX_SPEED: f32 = 4.0;

/// Changes playback rate by `factor`, clamped to `[0.25, 4.0]`.
pub fn change_speed(input: &SampleBuffer, factor: f32) -> SampleBuffer {
    let factor = sanitize_param(factor, MIN_SPEED, MAX_SPEED, 1.0);
    if factor == 1.0 || input.is_empty() {
        return input.clone();
    }

    let step = f64::from(factor);
    let out_len = (input.len() as f64 / step).round() as usize;

    let channels = input
        .channels()
        .iter()
        .map(|ch| interpolate_channel(ch, out_len, step))
        .collect();

    SampleBuffer::from_validated(channels, input.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_factor_is_identity() {
        let input = SampleBuffer::from_mono(vec![0.1, 0.2, 0.3], 48000).unwrap();
        assert_eq!(change_speed(&input, 1.0), input);
    }

    #[test]
    fn double_speed_halves_length() {
        let input = SampleBuffer::from_mono(vec![0.0; 1000], 48000).unwrap();
        let out = change_speed(&input, 2.0);
        assert_eq!(out.len(), 500);
        assert_eq!(out.sample_rate(), 48000);
    }

    #[test]
    fn half_speed_doubles_length_and_interpolates() {
        let input = SampleBuffer::from_mono(vec![0.0, 1.0], 48000).unwrap();
        let out = change_speed(&input, 0.5);
        assert_eq!(out.len(), 4);
        assert!((out.channel(0)[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn factor_clamped_to_range() {
        let input = SampleBuffer::from_mono(vec![0.0; 100], 48000).unwrap();
        // 100.0 clamps to 4.0, so length is 25, not 1.
        assert_eq!(change_speed(&input, 100.0).len(), 25);
        assert_eq!(change_speed(&input, 0.0).len(), 400);
    }

    #[test]
    fn nan_factor_is_identity() {
        let input = SampleBuffer::from_mono(vec![0.3; 10], 48000).unwrap();
        assert_eq!(change_speed(&input, f32::NAN), input);
    }
}
