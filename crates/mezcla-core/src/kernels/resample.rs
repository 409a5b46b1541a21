//! Linear-interpolation resampling.
//!
//! Shared index-mapping policy for the speed kernel and for sample-rate
//! matching in the join kernel: an output sample at fractional source
//! position `p` is the linear blend of the two neighbouring source samples.
//! This policy is fixed — every caller interpolates the same way, so a graph
//! re-evaluation reproduces the same bytes.

use crate::buffer::SampleBuffer;

/// Resamples one channel to `out_len` samples, stepping `step` source
/// samples per output sample.
pub(crate) fn interpolate_channel(src: &[f32], out_len: usize, step: f64) -> Vec<f32> {
    if src.is_empty() {
        return Vec::new();
    }
    let last = src.len() - 1;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * step;
        let idx = (pos.floor() as usize).min(last);
        let frac = (pos - idx as f64) as f32;
        let a = src[idx];
        let b = src[(idx + 1).min(last)];
        out.push(a + (b - a) * frac);
    }
    out
}

/// Converts `input` to `target_rate`, preserving duration.
///
/// The frame count scales by `target_rate / input_rate` (rounded); sample
/// values at fractional source indices are linearly interpolated. A matching
/// rate returns a plain copy.
pub fn resample_to_rate(input: &SampleBuffer, target_rate: u32) -> SampleBuffer {
    if target_rate == input.sample_rate() || input.is_empty() {
        let channels = input.channels().to_vec();
        return SampleBuffer::from_validated(channels, target_rate.max(1));
    }

    let ratio = f64::from(target_rate) / f64::from(input.sample_rate());
    let out_len = (input.len() as f64 * ratio).round() as usize;
    let step = 1.0 / ratio;

    let channels = input
        .channels()
        .iter()
        .map(|ch| interpolate_channel(ch, out_len, step))
        .collect();

    SampleBuffer::from_validated(channels, target_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_copy() {
        let input = SampleBuffer::from_mono(vec![0.1, 0.2, 0.3], 48000).unwrap();
        let out = resample_to_rate(&input, 48000);
        assert_eq!(out, input);
    }

    #[test]
    fn upsampling_doubles_length() {
        let input = SampleBuffer::from_mono(vec![0.0, 1.0], 24000).unwrap();
        let out = resample_to_rate(&input, 48000);
        assert_eq!(out.sample_rate(), 48000);
        assert_eq!(out.len(), 4);
        // Position 0.5 interpolates halfway between the two samples.
        assert!((out.channel(0)[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downsampling_halves_length() {
        let input = SampleBuffer::from_mono(vec![0.0, 0.25, 0.5, 0.75], 48000).unwrap();
        let out = resample_to_rate(&input, 24000);
        assert_eq!(out.len(), 2);
        assert_eq!(out.channel(0), &[0.0, 0.5]);
    }

    #[test]
    fn duration_is_preserved() {
        let input = SampleBuffer::from_mono(vec![0.5; 44100], 44100).unwrap();
        let out = resample_to_rate(&input, 48000);
        assert!((out.duration_secs() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn empty_input_changes_rate_only() {
        let input = SampleBuffer::silence(1, 0, 44100).unwrap();
        let out = resample_to_rate(&input, 48000);
        assert!(out.is_empty());
        assert_eq!(out.sample_rate(), 48000);
    }
}
