//! One-pole low-pass "soften" with dry/wet mix.
//!
//! Per channel, a single-pole IIR low-pass:
//!
//! ```text
//! α    = Δt / (RC + Δt),  Δt = 1 / sample_rate,  RC = 1 / (2π · cutoff)
//! y[n] = α · x[n] + (1 − α) · y[n−1]
//! ```
//!
//! The filter state is seeded with `y[−1] = x[0]`, so there is no leading
//! transient from zero. The output is the dry/wet blend
//! `x[n] · (1 − wet) + y[n] · wet` with `wet = intensity / 100`.
//!
//! The kernel is stateless across invocations — each call reconstructs its
//! state from the buffer's own first sample, which is what makes re-running
//! it under the scheduler bit-reproducible.

use super::sanitize_param;
use crate::buffer::SampleBuffer;

/// Lowest selectable cutoff in Hz.
pub const MIN_CUTOFF_HZ: f32 = 1000.0;
/// Highest selectable cutoff in Hz.
pub const MAX_CUTOFF_HZ: f32 = 16000.0;

/// Applies the low-pass soften to every channel of `input`.
///
/// `cutoff_hz` is clamped to `[1000, 16000]`, `intensity_pct` to `[0, 100]`.
/// An intensity of exactly zero short-circuits to a copy of the input —
/// bypassing the filter math entirely so no floating-point drift can creep
/// into a nominally-dry signal.
pub fn soften(input: &SampleBuffer, cutoff_hz: f32, intensity_pct: f32) -> SampleBuffer {
    let cutoff = sanitize_param(cutoff_hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ, 8000.0);
    let intensity = sanitize_param(intensity_pct, 0.0, 100.0, 50.0);

    if intensity == 0.0 {
        return input.clone();
    }

    let dt = 1.0 / input.sample_rate() as f32;
    let rc = 1.0 / (std::f32::consts::TAU * cutoff);
    let alpha = dt / (rc + dt);
    let wet = intensity / 100.0;
    let dry = 1.0 - wet;

    let channels = input
        .channels()
        .iter()
        .map(|ch| {
            let mut out = Vec::with_capacity(ch.len());
            let mut state = ch.first().copied().unwrap_or(0.0);
            for &x in ch {
                state = alpha * x + (1.0 - alpha) * state;
                out.push(x * dry + state * wet);
            }
            out
        })
        .collect();

    SampleBuffer::from_validated(channels, input.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: Vec<f32>) -> SampleBuffer {
        SampleBuffer::from_mono(samples, 48000).unwrap()
    }

    /// RMS of the first difference — a cheap roughness measure.
    fn first_diff_rms(samples: &[f32]) -> f32 {
        if samples.len() < 2 {
            return 0.0;
        }
        let sum: f32 = samples.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
        (sum / (samples.len() - 1) as f32).sqrt()
    }

    #[test]
    fn zero_intensity_is_bit_identical() {
        let input = mono((0..512).map(|i| (i as f32 * 0.21).sin()).collect());
        let out = soften(&input, 2000.0, 0.0);
        assert_eq!(out, input);
    }

    #[test]
    fn full_intensity_low_cutoff_smooths() {
        // Noisy alternating signal; a low cutoff at full wet must reduce the
        // sample-to-sample difference energy.
        let input = mono(
            (0..2048)
                .map(|i| if i % 2 == 0 { 0.8 } else { -0.8 })
                .collect(),
        );
        let out = soften(&input, 1000.0, 100.0);
        assert!(first_diff_rms(out.channel(0)) < first_diff_rms(input.channel(0)));
    }

    #[test]
    fn no_leading_transient() {
        // DC input: seeding y[-1] = x[0] means the very first output sample
        // already equals the input.
        let input = mono(vec![0.7; 64]);
        let out = soften(&input, 4000.0, 100.0);
        assert!((out.channel(0)[0] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn intensity_blends_toward_dry() {
        let input = mono((0..256).map(|i| (i as f32 * 0.4).sin()).collect());
        let half = soften(&input, 1000.0, 50.0);
        let full = soften(&input, 1000.0, 100.0);
        // Half wet must sit between dry and full wet, sample by sample.
        for i in 0..input.len() {
            let dry = input.channel(0)[i];
            let mid = half.channel(0)[i];
            let wet = full.channel(0)[i];
            let expected = 0.5 * dry + 0.5 * wet;
            assert!((mid - expected).abs() < 1e-5, "sample {i}");
        }
    }

    #[test]
    fn empty_buffer_passes_through() {
        let input = SampleBuffer::silence(2, 0, 48000).unwrap();
        let out = soften(&input, 4000.0, 80.0);
        assert!(out.is_empty());
        assert_eq!(out.channel_count(), 2);
    }

    #[test]
    fn nan_parameters_are_clamped() {
        let input = mono(vec![0.5; 16]);
        let out = soften(&input, f32::NAN, f32::NAN);
        assert!(out.channel(0).iter().all(|s| s.is_finite()));
    }
}
